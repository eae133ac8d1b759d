//! Outbound Transport
//!
//! The boundary through which commands and user publishes leave the process.
//!
//! - **DaprTransport**: publishes through a Dapr sidecar's pub/sub HTTP API,
//!   which forwards to the MQTT broker
//! - **MemoryTransport**: records publishes in memory (local runs and tests)

mod dapr;
mod memory;

pub use dapr::{DaprConfig, DaprTransport};
pub use memory::{MemoryTransport, Published};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Publishes a JSON payload on a topic
#[async_trait]
pub trait Transport: Send + Sync {
    /// Resolves once the transport has accepted the publish
    async fn publish(&self, topic: &str, payload: &Value) -> Result<(), TransportError>;

    /// Whether the transport can currently accept publishes
    async fn health_check(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Errors raised by the outbound transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    #[error("Publish timed out after {0} ms")]
    Timeout(u64),

    #[error("Transport rejected publish ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}
