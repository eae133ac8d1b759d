//! Command Dispatcher
//!
//! Routes commands back to individual printers, and publishes arbitrary
//! user messages, through the outbound [`Transport`]. Every publish is
//! bounded by `publish_timeout`.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::store::PrinterCommand;
use crate::topic::{validate_topic, TopicError, TopicPattern, TopicScheme};
use crate::transport::{Transport, TransportError};

/// Errors surfaced to callers of the dispatcher
#[derive(Error, Debug)]
pub enum CommandError {
    /// Device identifier was empty or contained a topic delimiter
    #[error("Invalid device id: '{0}'")]
    InvalidDevice(String),

    #[error(transparent)]
    Topic(#[from] TopicError),

    #[error("Payload could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub struct CommandDispatcher {
    transport: Arc<dyn Transport>,
    command_pattern: TopicPattern,
    publish_timeout: Duration,
}

impl CommandDispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        scheme: &TopicScheme,
        publish_timeout: Duration,
    ) -> Result<Self, TopicError> {
        Ok(Self {
            transport,
            command_pattern: TopicPattern::parse(&scheme.printer_commands())?,
            publish_timeout,
        })
    }

    /// Command topic for one device, e.g. `university/lab/printer/printer-7/commands`
    pub fn command_topic(&self, device_id: &str) -> Result<String, CommandError> {
        if device_id.is_empty() || device_id.contains(crate::topic::DELIMITER) {
            return Err(CommandError::InvalidDevice(device_id.to_string()));
        }
        Ok(self.command_pattern.render(device_id))
    }

    /// Publish a command to one device; returns the topic it was sent on
    ///
    /// Succeeds once the transport accepts the publish. The device does not
    /// confirm delivery.
    pub async fn send_command(
        &self,
        device_id: &str,
        command: &PrinterCommand,
    ) -> Result<String, CommandError> {
        let topic = self.command_topic(device_id)?;

        tracing::info!(
            device_id = %device_id,
            action = %command.action,
            topic = %topic,
            "Sending command"
        );

        self.publish(&topic, command).await?;
        Ok(topic)
    }

    /// Publish any serializable payload on a concrete topic
    pub async fn publish<T: Serialize + ?Sized>(
        &self,
        topic: &str,
        payload: &T,
    ) -> Result<(), CommandError> {
        validate_topic(topic)?;
        let payload = serde_json::to_value(payload)?;

        match tokio::time::timeout(self.publish_timeout, self.transport.publish(topic, &payload))
            .await
        {
            Ok(result) => result.map_err(|e| {
                tracing::warn!(topic = %topic, error = %e, "Publish failed");
                CommandError::Transport(e)
            }),
            Err(_) => {
                let ms = self.publish_timeout.as_millis() as u64;
                tracing::warn!(topic = %topic, timeout_ms = ms, "Publish timed out");
                Err(CommandError::Transport(TransportError::Timeout(ms)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CommandAction, Message};
    use crate::transport::MemoryTransport;

    fn dispatcher(transport: Arc<MemoryTransport>, timeout: Duration) -> CommandDispatcher {
        CommandDispatcher::new(transport, &TopicScheme::default(), timeout).unwrap()
    }

    #[tokio::test]
    async fn test_send_command_publishes_once() {
        let transport = Arc::new(MemoryTransport::new());
        let dispatcher = dispatcher(Arc::clone(&transport), Duration::from_secs(1));

        let topic = dispatcher
            .send_command("printer-7", &PrinterCommand::new(CommandAction::PausePrint))
            .await
            .unwrap();

        assert_eq!(topic, "university/lab/printer/printer-7/commands");
        let published = transport.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, topic);
        assert_eq!(published[0].payload["action"], "pause_print");
    }

    #[tokio::test]
    async fn test_invalid_device_id() {
        let transport = Arc::new(MemoryTransport::new());
        let dispatcher = dispatcher(Arc::clone(&transport), Duration::from_secs(1));
        let cmd = PrinterCommand::new(CommandAction::HomeAxes);

        assert!(matches!(
            dispatcher.send_command("", &cmd).await,
            Err(CommandError::InvalidDevice(_))
        ));
        assert!(matches!(
            dispatcher.send_command("a/b", &cmd).await,
            Err(CommandError::InvalidDevice(_))
        ));
        assert!(transport.published().is_empty());
    }

    #[tokio::test]
    async fn test_transport_unreachable() {
        let transport = Arc::new(MemoryTransport::offline());
        let dispatcher = dispatcher(transport, Duration::from_secs(1));

        let result = dispatcher
            .send_command("printer-1", &PrinterCommand::new(CommandAction::EmergencyStop))
            .await;
        assert!(matches!(
            result,
            Err(CommandError::Transport(TransportError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_publish_timeout() {
        let transport = Arc::new(MemoryTransport::with_delay(Duration::from_millis(500)));
        let dispatcher = dispatcher(Arc::clone(&transport), Duration::from_millis(20));

        let result = dispatcher.publish("new-orders", &Message::new("hi")).await;
        assert!(matches!(
            result,
            Err(CommandError::Transport(TransportError::Timeout(20)))
        ));
        assert!(transport.published().is_empty());
    }

    #[tokio::test]
    async fn test_publish_rejects_wildcards_and_empty() {
        let transport = Arc::new(MemoryTransport::new());
        let dispatcher = dispatcher(Arc::clone(&transport), Duration::from_secs(1));

        assert!(matches!(
            dispatcher.publish("", &Message::new("x")).await,
            Err(CommandError::Topic(TopicError::Empty))
        ));
        assert!(matches!(
            dispatcher.publish("lab/+/x", &Message::new("x")).await,
            Err(CommandError::Topic(TopicError::WildcardInTopic(_)))
        ));

        dispatcher.publish("new-orders", &Message::new("x")).await.unwrap();
        assert_eq!(transport.published_to("new-orders").len(), 1);
    }
}
