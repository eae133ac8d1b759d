//! LabRelay HTTP API
//!
//! HTTP surface for the relay, built with Axum.
//!
//! # Endpoints
//!
//! ## Messaging
//! - `POST /messaging/publish` - Publish a message (default topic `new-orders`)
//! - `POST /messaging/inbound` - Dapr CloudEvent delivery
//! - `GET /dapr/subscribe` - Dapr subscription discovery
//!
//! ## Printers
//! - `GET /api/v1/printers` - Latest telemetry of every printer
//! - `GET /api/v1/printers/:id/telemetry` - Latest telemetry of one printer
//! - `GET /api/v1/printers/:id/events` - Recent events (`?limit=`, default 50)
//! - `GET /api/v1/printers/:id/jobs` - Jobs of one printer
//! - `POST /api/v1/printers/:id/commands` - Send a command
//!
//! ## Jobs and Equipment
//! - `GET /api/v1/jobs`, `GET /api/v1/jobs/:id`
//! - `GET /api/v1/equipment`, `GET /api/v1/equipment/:id`
//!
//! ## Health
//! - `GET /health/live` - Liveness check
//! - `GET /health/ready` - Readiness check
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /printerhub` - Real-time dashboard updates
//!
//! # Example
//!
//! ```rust,ignore
//! use labrelay::api::{serve, AppState};
//! use labrelay::config::Config;
//! use labrelay::transport::MemoryTransport;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let api = config.api.clone();
//!
//!     let state = AppState::new(config, Arc::new(MemoryTransport::new()))?;
//!     serve(state, &api).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use crate::config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::websocket::websocket_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Printer routes
        .route("/printers", get(routes::printers::list_printers))
        .route("/printers/:id/telemetry", get(routes::printers::get_telemetry))
        .route("/printers/:id/events", get(routes::printers::get_events))
        .route("/printers/:id/jobs", get(routes::printers::get_printer_jobs))
        .route("/printers/:id/commands", post(routes::printers::send_command))
        // Job routes
        .route("/jobs", get(routes::jobs::list_jobs))
        .route("/jobs/:id", get(routes::jobs::get_job))
        // Equipment routes
        .route("/equipment", get(routes::equipment::list_equipment))
        .route("/equipment/:id", get(routes::equipment::get_equipment));

    let messaging_routes = Router::new()
        .route("/publish", post(routes::messaging::publish_message))
        .route("/inbound", post(routes::messaging::receive_inbound));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let body_limit = state.config.api.max_body_size;

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/messaging", messaging_routes)
        .route("/dapr/subscribe", get(routes::dapr::subscriptions))
        .nest("/health", health_routes)
        .route("/printerhub", get(websocket_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        // Dashboards are served from other origins
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("LabRelay API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("LabRelay API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
