//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::command::CommandError;
use crate::ingest::IngestError;
use crate::transport::TransportError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Inbound message could not be routed or decoded
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Outbound publish failed
    #[error("Publish error: {0}")]
    Command(#[from] CommandError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// HTTP status and machine-readable code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Ingest(e) => match e {
                IngestError::Topic(_) => (StatusCode::BAD_REQUEST, "INVALID_TOPIC"),
                // A 404 tells the Dapr sidecar to drop the message
                IngestError::Unrouted(_) => (StatusCode::NOT_FOUND, "UNROUTED_TOPIC"),
                IngestError::Decode { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "DECODE_ERROR"),
                IngestError::Encode { .. } | IngestError::Store { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INGEST_ERROR")
                }
            },
            ApiError::Command(e) => match e {
                CommandError::InvalidDevice(_) => (StatusCode::BAD_REQUEST, "INVALID_DEVICE"),
                CommandError::Topic(_) => (StatusCode::BAD_REQUEST, "INVALID_TOPIC"),
                CommandError::Encode(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ENCODE_ERROR"),
                CommandError::Transport(TransportError::Timeout(_)) => {
                    (StatusCode::GATEWAY_TIMEOUT, "PUBLISH_TIMEOUT")
                }
                CommandError::Transport(_) => (StatusCode::BAD_GATEWAY, "TRANSPORT_ERROR"),
            },
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let request_id = uuid::Uuid::new_v4().to_string();

        // Log the error
        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::MessageKind;

    #[test]
    fn test_ingest_status_codes() {
        let unrouted = ApiError::from(IngestError::Unrouted("x/y".to_string()));
        assert_eq!(unrouted.status_and_code().0, StatusCode::NOT_FOUND);

        let source = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        let decode = ApiError::from(IngestError::Decode {
            kind: MessageKind::PrinterTelemetry,
            source,
        });
        assert_eq!(decode.status_and_code(), (StatusCode::INTERNAL_SERVER_ERROR, "DECODE_ERROR"));
    }

    #[test]
    fn test_command_status_codes() {
        let timeout = ApiError::from(CommandError::Transport(TransportError::Timeout(3000)));
        assert_eq!(timeout.status_and_code().0, StatusCode::GATEWAY_TIMEOUT);

        let down = ApiError::from(CommandError::Transport(TransportError::Unavailable(
            "sidecar".to_string(),
        )));
        assert_eq!(down.status_and_code().0, StatusCode::BAD_GATEWAY);

        let invalid = ApiError::from(CommandError::InvalidDevice(String::new()));
        assert_eq!(invalid.status_and_code().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_response() {
        let response = ApiError::NotFound("printer 'x'".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
