//! Ingestion error types

use thiserror::Error;

use crate::store::StoreError;
use crate::topic::{MessageKind, TopicError};

/// Errors from dispatching a single inbound message
///
/// Each error is local to one message; the router keeps serving.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The topic itself was malformed
    #[error(transparent)]
    Topic(#[from] TopicError),

    /// No registered pattern matches the topic
    #[error("No route registered for topic '{0}'")]
    Unrouted(String),

    /// Payload does not match the shape expected for the route
    #[error("Failed to decode {kind} payload: {source}")]
    Decode {
        kind: MessageKind,
        #[source]
        source: serde_json::Error,
    },

    /// Decoded message could not be re-encoded for observers
    #[error("Failed to encode {kind} for broadcast: {source}")]
    Encode {
        kind: MessageKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store rejected {kind}: {source}")]
    Store {
        kind: MessageKind,
        #[source]
        source: StoreError,
    },
}

/// Result type alias for ingestion
pub type IngestResult<T> = Result<T, IngestError>;
