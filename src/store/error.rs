//! Device state store error types

use thiserror::Error;

/// Errors that can occur when mutating the device state store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Device, equipment or job identifier was empty
    #[error("Identifier must not be empty")]
    EmptyId,
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
