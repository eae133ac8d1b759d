//! Device State
//!
//! - **types**: wire types for telemetry, events, jobs, equipment and commands
//! - **state**: the concurrent `DeviceStateStore`
//! - **error**: error types
//!
//! # Example
//!
//! ```rust
//! use labrelay::store::*;
//!
//! let store = DeviceStateStore::new(StoreConfig::default());
//!
//! store
//!     .upsert_telemetry(
//!         "printer-7",
//!         PrinterTelemetry::new("printer-7", PrinterStatus::Printing).progress(42.0),
//!     )
//!     .unwrap();
//! store
//!     .append_event("printer-7", PrinterEvent::new("printer-7", EventKind::Info, "layer 45"))
//!     .unwrap();
//!
//! assert_eq!(store.telemetry("printer-7").unwrap().print_progress, 42.0);
//! assert_eq!(store.events("printer-7", DEFAULT_EVENT_LIMIT).len(), 1);
//! ```

mod error;
mod state;
mod types;

pub use error::{StoreError, StoreResult};
pub use state::{DeviceStateStore, StoreConfig, DEFAULT_EVENT_LIMIT};
pub use types::{
    Attributes, CommandAction, EquipmentTelemetry, EventKind, JobStatus, Message, PrintJob,
    PrinterCommand, PrinterEvent, PrinterStatus, PrinterTelemetry,
};
