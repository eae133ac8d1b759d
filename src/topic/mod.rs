//! Topic Routing
//!
//! - **pattern**: single-level wildcard patterns and matching
//! - **registry**: the startup registration table mapping patterns to
//!   message kinds
//! - **error**: error types
//!
//! # Topic layout
//!
//! ```text
//! university/lab/printer/{id}/telemetry    → PrinterTelemetry
//! university/lab/printer/{id}/events       → PrinterEvent
//! university/lab/printer/{id}/jobs         → PrintJob
//! university/lab/equipment/{id}/telemetry  → EquipmentTelemetry
//! university/lab/printer/{id}/commands     ← outbound commands
//! ```
//!
//! In patterns the `{id}` position is written as the wildcard `+`.

mod error;
mod pattern;
mod registry;

pub use error::{TopicError, TopicResult};
pub use pattern::{matches, validate_topic, Segment, TopicPattern, DELIMITER, WILDCARD};
pub use registry::{
    MessageKind, Route, TopicRegistry, TopicRegistryBuilder, TopicScheme, DEFAULT_PREFIX,
    GENERIC_TOPIC,
};
