//! Dapr sidecar pub/sub client
//!
//! Publishes with `POST {base_url}/v1.0/publish/{pubsub}/{topic}`. Topics
//! contain `/`, so they are percent-encoded into a single path segment.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::{Transport, TransportError};

/// Configuration for the Dapr sidecar client
#[derive(Debug, Clone)]
pub struct DaprConfig {
    /// Sidecar HTTP endpoint (e.g., "http://localhost:3500")
    pub base_url: String,
    /// Name of the pub/sub component
    pub pubsub_name: String,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for DaprConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3500".to_string(),
            pubsub_name: "mqtt-pubsub".to_string(),
            request_timeout_ms: 5000,
        }
    }
}

/// Transport backed by a Dapr sidecar
pub struct DaprTransport {
    client: Client,
    config: DaprConfig,
}

impl DaprTransport {
    pub fn new(config: DaprConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DaprConfig {
        &self.config
    }

    /// Publish URL for a topic
    pub fn publish_url(&self, topic: &str) -> String {
        format!(
            "{}/v1.0/publish/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.config.pubsub_name),
            urlencoding::encode(topic)
        )
    }
}

#[async_trait]
impl Transport for DaprTransport {
    async fn publish(&self, topic: &str, payload: &Value) -> Result<(), TransportError> {
        let url = self.publish_url(topic);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(map_reqwest)?;

        if response.status().is_success() {
            tracing::debug!(topic = %topic, "Published through Dapr sidecar");
            Ok(())
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(TransportError::Rejected {
                status: status.as_u16(),
                message: text,
            })
        }
    }

    /// Checks the sidecar's health endpoint
    async fn health_check(&self) -> Result<(), TransportError> {
        let url = format!(
            "{}/v1.0/healthz",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self.client.get(&url).send().await.map_err(map_reqwest)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(TransportError::Unavailable(format!(
                "sidecar health returned {}",
                response.status()
            )))
        }
    }
}

fn map_reqwest(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Unavailable("sidecar request timed out".to_string())
    } else if e.is_connect() {
        TransportError::Unavailable(e.to_string())
    } else {
        TransportError::Request(e)
    }
}
