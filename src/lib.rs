//! # LabRelay
//!
//! Topic routing, live device state and real-time fan-out for university lab
//! 3D printers and equipment, speaking MQTT through a Dapr sidecar.
//!
//! ## Features
//!
//! - **Topic routing**: `+` wildcard patterns bind the device id from the topic
//! - **Live state**: latest telemetry, bounded event logs, jobs and equipment
//! - **Real-time**: every accepted message is pushed to WebSocket dashboards
//! - **Commands**: per-printer command topics published with a bounded timeout
//!
//! ## Modules
//!
//! - [`topic`]: Topic patterns and the routing registry
//! - [`store`]: Concurrent device state store
//! - [`ingest`]: Inbound message router
//! - [`command`]: Outbound command dispatcher
//! - [`transport`]: Dapr and in-memory publish transports
//! - [`websocket`]: Dashboard connection hub
//! - [`query`]: Read-only query facade
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use labrelay::{Config, DeviceStateStore, IngestionRouter, TopicRegistry};
//! use labrelay::websocket::{ConnectionHub, HubConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let registry = TopicRegistry::lab_defaults(&config.topics.scheme())?;
//!     let store = Arc::new(DeviceStateStore::new(config.state.store()));
//!     let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
//!
//!     let router = IngestionRouter::new(registry, Arc::clone(&store), hub);
//!     router
//!         .dispatch(
//!             "university/lab/printer/printer-7/telemetry",
//!             br#"{"status": "printing", "printProgress": 42.0}"#,
//!         )
//!         .await?;
//!
//!     assert!(store.telemetry("printer-7").unwrap().is_printing());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod command;
pub mod config;
pub mod ingest;
pub mod query;
pub mod store;
pub mod topic;
pub mod transport;
pub mod websocket;

// Re-export top-level types for convenience
pub use topic::{MessageKind, TopicError, TopicPattern, TopicRegistry, TopicScheme};

pub use store::{
    DeviceStateStore, EquipmentTelemetry, PrintJob, PrinterCommand, PrinterEvent,
    PrinterTelemetry, StoreConfig, StoreError,
};

pub use ingest::{DispatchOutcome, IngestError, IngestionRouter};

pub use command::{CommandDispatcher, CommandError};

pub use transport::{DaprConfig, DaprTransport, MemoryTransport, Transport, TransportError};

pub use query::{HealthSummary, QueryFacade};

pub use api::{build_router, serve, ApiError, AppState};

pub use websocket::{Broadcaster, ConnectionHub, HubConfig, HubError, ServerMessage};

pub use config::{Config, ConfigError, LoggingConfig};
