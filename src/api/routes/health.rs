//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes liveness and readiness checks.
//!
//! - GET /health/live - Liveness check (process is alive)
//! - GET /health/ready - Readiness check (ready to serve traffic)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Kubernetes liveness check.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness check.
/// Ready once topics are registered and the outbound transport answers.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.router.registry().is_empty() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    match check_transport_health(&state).await {
        true => StatusCode::OK,
        false => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /health
///
/// Full health status with device counters.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let transport_ok = check_transport_health(&state).await;

    let (status, transport) = if transport_ok {
        ("healthy", "ok")
    } else {
        ("degraded", "error")
    };

    Json(HealthResponse {
        status: status.to_string(),
        transport: transport.to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        summary: state.facade.health().await,
    })
}

async fn check_transport_health(state: &AppState) -> bool {
    match state.transport.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Transport health check failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }
}
