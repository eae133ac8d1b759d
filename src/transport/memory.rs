//! In-memory transport
//!
//! Keeps every accepted publish in order. Used when no sidecar is configured
//! and as the test double for command dispatch.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;

use super::{Transport, TransportError};

/// A publish accepted by the memory transport
#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub topic: String,
    pub payload: Value,
}

#[derive(Debug, Default)]
pub struct MemoryTransport {
    published: Mutex<Vec<Published>>,
    delay: Option<Duration>,
    offline: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that fails every publish as unreachable
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Transport that waits before accepting each publish
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Snapshot of everything published so far
    pub fn published(&self) -> Vec<Published> {
        self.published
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Publishes on one topic
    pub fn published_to(&self, topic: &str) -> Vec<Published> {
        self.published()
            .into_iter()
            .filter(|p| p.topic == topic)
            .collect()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn publish(&self, topic: &str, payload: &Value) -> Result<(), TransportError> {
        if self.offline {
            return Err(TransportError::Unavailable("memory transport offline".to_string()));
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut published = self
            .published
            .lock()
            .map_err(|_| TransportError::Unavailable("memory transport poisoned".to_string()))?;
        published.push(Published {
            topic: topic.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        if self.offline {
            return Err(TransportError::Unavailable("memory transport offline".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_records_in_order() {
        let transport = MemoryTransport::new();
        transport.publish("a", &json!(1)).await.unwrap();
        transport.publish("b", &json!(2)).await.unwrap();
        transport.publish("a", &json!(3)).await.unwrap();

        let topics: Vec<String> = transport.published().into_iter().map(|p| p.topic).collect();
        assert_eq!(topics, vec!["a", "b", "a"]);
        assert_eq!(transport.published_to("a").len(), 2);
    }

    #[tokio::test]
    async fn test_offline() {
        let transport = MemoryTransport::offline();
        let result = transport.publish("a", &json!({})).await;
        assert!(matches!(result, Err(TransportError::Unavailable(_))));
        assert!(transport.published().is_empty());
        assert!(transport.health_check().await.is_err());
        assert!(MemoryTransport::new().health_check().await.is_ok());
    }
}
