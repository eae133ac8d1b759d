//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::store::StoreConfig;
use crate::topic::{TopicScheme, DEFAULT_PREFIX};
use crate::transport::DaprConfig;
use crate::websocket::HubConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub realtime: RealtimeConfig,

    #[serde(default)]
    pub state: StateConfig,

    #[serde(default)]
    pub topics: TopicsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_size() -> usize {
    1024 * 1024 // 1 MB
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Outbound transport (Dapr sidecar) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// When false, publishes are kept in memory instead of sent to a sidecar
    #[serde(default = "default_transport_enabled")]
    pub enabled: bool,

    #[serde(default = "default_dapr_url")]
    pub dapr_url: String,

    #[serde(default = "default_pubsub_name")]
    pub pubsub_name: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Upper bound for a single outbound publish
    #[serde(default = "default_publish_timeout_ms")]
    pub publish_timeout_ms: u64,
}

fn default_transport_enabled() -> bool {
    true
}

fn default_dapr_url() -> String {
    "http://localhost:3500".to_string()
}

fn default_pubsub_name() -> String {
    "mqtt-pubsub".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_publish_timeout_ms() -> u64 {
    3000
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            enabled: default_transport_enabled(),
            dapr_url: default_dapr_url(),
            pubsub_name: default_pubsub_name(),
            request_timeout_ms: default_request_timeout_ms(),
            publish_timeout_ms: default_publish_timeout_ms(),
        }
    }
}

impl TransportConfig {
    pub fn dapr(&self) -> DaprConfig {
        DaprConfig {
            base_url: self.dapr_url.clone(),
            pubsub_name: self.pubsub_name.clone(),
            request_timeout_ms: self.request_timeout_ms,
        }
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }
}

/// Real-time observer hub configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    #[serde(default = "default_connection_buffer")]
    pub connection_buffer: usize,
}

fn default_max_connections() -> usize {
    1000
}

fn default_connection_buffer() -> usize {
    256
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            connection_buffer: default_connection_buffer(),
        }
    }
}

impl RealtimeConfig {
    pub fn hub(&self) -> HubConfig {
        HubConfig {
            max_connections: self.max_connections,
            connection_buffer: self.connection_buffer,
        }
    }
}

/// Device state configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StateConfig {
    /// Events retained per device (0 = unbounded)
    #[serde(default = "default_max_events")]
    pub max_events_per_device: usize,
}

fn default_max_events() -> usize {
    1000
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            max_events_per_device: default_max_events(),
        }
    }
}

impl StateConfig {
    pub fn store(&self) -> StoreConfig {
        StoreConfig {
            max_events_per_device: self.max_events_per_device,
        }
    }
}

/// Topic naming configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TopicsConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

impl TopicsConfig {
    pub fn scheme(&self) -> TopicScheme {
        TopicScheme::new(&self.prefix)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("labrelay").join("config.toml")),
            Some(PathBuf::from("/etc/labrelay/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(host) = lookup("LABRELAY_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("LABRELAY_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        // Transport overrides
        if let Some(url) = lookup("LABRELAY_DAPR_URL") {
            self.transport.dapr_url = url;
        }
        if let Some(pubsub) = lookup("LABRELAY_PUBSUB") {
            self.transport.pubsub_name = pubsub;
        }
        if let Some(enabled) = lookup("LABRELAY_TRANSPORT_ENABLED") {
            self.transport.enabled = enabled.to_lowercase() != "false" && enabled != "0";
        }

        // State and topic overrides
        if let Some(max) = lookup("LABRELAY_MAX_EVENTS").and_then(|m| m.parse().ok()) {
            self.state.max_events_per_device = max;
        }
        if let Some(prefix) = lookup("LABRELAY_TOPIC_PREFIX") {
            self.topics.prefix = prefix;
        }

        // Logging overrides
        if let Some(level) = lookup("LABRELAY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LABRELAY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# LabRelay Configuration
#
# Environment variables override these settings:
# - LABRELAY_API_HOST
# - LABRELAY_API_PORT
# - LABRELAY_DAPR_URL
# - LABRELAY_PUBSUB
# - LABRELAY_TRANSPORT_ENABLED
# - LABRELAY_MAX_EVENTS
# - LABRELAY_TOPIC_PREFIX
# - LABRELAY_LOG_LEVEL
# - LABRELAY_LOG_FORMAT

[api]
# HTTP server host
host = "0.0.0.0"

# HTTP server port
port = 8080

# Maximum request body size (bytes)
max_body_size = 1048576

[transport]
# Publish through the Dapr sidecar; false keeps publishes in memory
enabled = true

# Dapr sidecar HTTP endpoint
dapr_url = "http://localhost:3500"

# Dapr pub/sub component name
pubsub_name = "mqtt-pubsub"

# Sidecar request timeout (ms)
request_timeout_ms = 5000

# Upper bound for one outbound publish (ms)
publish_timeout_ms = 3000

[realtime]
# Maximum concurrent dashboard connections
max_connections = 1000

# Per-connection outbound queue; updates are dropped for a full queue
connection_buffer = 256

[state]
# Events kept per device, oldest evicted first (0 = unbounded)
max_events_per_device = 1000

[topics]
# Prefix for printer and equipment topics
prefix = "university/lab"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.addr(), "0.0.0.0:8080");
        assert_eq!(config.transport.pubsub_name, "mqtt-pubsub");
        assert_eq!(config.transport.publish_timeout(), Duration::from_secs(3));
        assert_eq!(config.state.max_events_per_device, 1000);
        assert_eq!(config.topics.scheme().prefix(), "university/lab");
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.realtime.connection_buffer, 256);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[api]\nport = 9090\n\n[state]\nmax_events_per_device = 10\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.port, 9090);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.state.store().max_events_per_device, 10);
        assert_eq!(config.transport.dapr_url, "http://localhost:3500");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[api\nport = ").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("LABRELAY_API_PORT", "7000"),
            ("LABRELAY_DAPR_URL", "http://dapr:3500"),
            ("LABRELAY_TRANSPORT_ENABLED", "false"),
            ("LABRELAY_MAX_EVENTS", "0"),
            ("LABRELAY_TOPIC_PREFIX", "campus/makerspace"),
            ("LABRELAY_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.port, 7000);
        assert_eq!(config.transport.dapr().base_url, "http://dapr:3500");
        assert!(!config.transport.enabled);
        assert_eq!(config.state.max_events_per_device, 0);
        assert_eq!(
            config.topics.scheme().printer_telemetry(),
            "campus/makerspace/printer/+/telemetry"
        );
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_invalid_port_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "LABRELAY_API_PORT").then(|| "nope".to_string()));
        assert_eq!(config.api.port, 8080);
    }
}
