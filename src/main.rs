//! LabRelay Server
//!
//! Run with: cargo run --bin labrelay
//!
//! # Configuration
//!
//! Loaded from the first of `~/.config/labrelay/config.toml`,
//! `/etc/labrelay/config.toml` or `./config.toml`, then overridden by
//! `LABRELAY_*` environment variables (see `labrelay-cli config`).
//! `RUST_LOG` takes precedence over `logging.level` when set.

use labrelay::api::{serve, AppState};
use labrelay::config::{Config, LoggingConfig};
use labrelay::transport::{DaprTransport, MemoryTransport, Transport};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Starting LabRelay server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Topic prefix: {}", config.topics.prefix);

    let transport = build_transport(&config).await?;

    let api_config = config.api.clone();
    let state = AppState::new(config, transport)?;

    for pattern in state.router.registry().patterns() {
        tracing::info!(pattern = %pattern, "Registered topic");
    }

    // Run server
    tracing::info!("Starting server on {}:{}", api_config.host, api_config.port);
    serve(state, &api_config).await?;

    tracing::info!("LabRelay server stopped");
    Ok(())
}

/// Initialize tracing with the configured level and format
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("labrelay={},tower_http=debug", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Dapr sidecar transport, or the in-memory one when disabled
async fn build_transport(config: &Config) -> Result<Arc<dyn Transport>, Box<dyn std::error::Error>> {
    if !config.transport.enabled {
        tracing::info!("Outbound transport disabled; publishes are kept in memory");
        return Ok(Arc::new(MemoryTransport::new()));
    }

    let dapr = DaprTransport::new(config.transport.dapr())?;
    tracing::info!(
        "Dapr sidecar: {} (pubsub '{}')",
        dapr.config().base_url,
        dapr.config().pubsub_name
    );

    // Check sidecar availability
    match dapr.health_check().await {
        Ok(()) => tracing::info!("Dapr sidecar connection verified"),
        Err(e) => tracing::warn!("Dapr sidecar not available: {} (commands will fail until it is)", e),
    }

    Ok(Arc::new(dapr))
}
