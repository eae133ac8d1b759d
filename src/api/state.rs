//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::command::CommandDispatcher;
use crate::config::Config;
use crate::ingest::IngestionRouter;
use crate::query::QueryFacade;
use crate::store::DeviceStateStore;
use crate::topic::{TopicError, TopicRegistry};
use crate::transport::Transport;
use crate::websocket::{Broadcaster, ConnectionHub};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Latest device state
    pub store: Arc<DeviceStateStore>,
    /// Inbound topic router
    pub router: Arc<IngestionRouter>,
    /// Outbound command and message publisher
    pub dispatcher: Arc<CommandDispatcher>,
    /// Read-only views for query endpoints
    pub facade: Arc<QueryFacade>,
    /// WebSocket connection hub for real-time updates
    pub ws_hub: Arc<ConnectionHub>,
    /// Outbound transport, kept for readiness checks
    pub transport: Arc<dyn Transport>,
    /// Loaded configuration
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Wire the store, hub, router and dispatcher from configuration
    ///
    /// Fails only if the configured topic prefix produces invalid or
    /// overlapping patterns.
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Result<Self, TopicError> {
        let scheme = config.topics.scheme();
        let registry = TopicRegistry::lab_defaults(&scheme)?;
        let patterns = registry.patterns();

        let store = Arc::new(DeviceStateStore::new(config.state.store()));
        let ws_hub = Arc::new(ConnectionHub::new(config.realtime.hub()));
        let broadcaster: Arc<dyn Broadcaster> = ws_hub.clone();

        let router = Arc::new(IngestionRouter::new(
            registry,
            Arc::clone(&store),
            broadcaster,
        ));
        let dispatcher = Arc::new(CommandDispatcher::new(
            Arc::clone(&transport),
            &scheme,
            config.transport.publish_timeout(),
        )?);
        let facade = Arc::new(QueryFacade::new(
            Arc::clone(&store),
            patterns,
            Arc::clone(&ws_hub),
        ));

        Ok(Self {
            store,
            router,
            dispatcher,
            facade,
            ws_hub,
            transport,
            config: Arc::new(config),
            start_time: Instant::now(),
        })
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    #[test]
    fn test_wiring_registers_lab_topics() {
        let state = AppState::new(Config::default(), Arc::new(MemoryTransport::new())).unwrap();
        assert_eq!(state.router.registry().len(), 5);
        assert_eq!(state.uptime_seconds(), 0);
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        let mut config = Config::default();
        config.topics.prefix = "lab//broken".to_string();
        assert!(AppState::new(config, Arc::new(MemoryTransport::new())).is_err());
    }
}
