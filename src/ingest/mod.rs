//! Message Ingestion
//!
//! Receives `(topic, payload)` pairs from the inbound transport, updates the
//! device state store and fans the decoded message out.

mod error;
mod router;

pub use error::{IngestError, IngestResult};
pub use router::{DispatchOutcome, IngestionRouter};
