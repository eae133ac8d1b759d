//! Ingestion Router
//!
//! Turns an inbound `(topic, payload)` pair into a store update followed by a
//! broadcast:
//!
//! ```text
//! topic ──► validate ──► registry.resolve ──► decode(kind) ──► store update ──► broadcast
//!              │ malformed     │ no route           │ bad payload
//!              ▼               ▼                    ▼
//!            Topic          Unrouted              Decode (state untouched)
//! ```
//!
//! The store update completes before the broadcast is issued, so an observer
//! that reacts to an update can always query it. Updates bound to a device are
//! also sent to that device's group (`printer:{id}` or `equipment:{id}`).

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::error::{IngestError, IngestResult};
use crate::store::{
    DeviceStateStore, EquipmentTelemetry, Message, PrintJob, PrinterEvent, PrinterTelemetry,
};
use crate::topic::{validate_topic, MessageKind, TopicRegistry};
use crate::websocket::Broadcaster;

/// What a successful dispatch did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub kind: MessageKind,
    /// Identifier bound by the topic wildcard, if the route has one
    pub device_id: Option<String>,
}

pub struct IngestionRouter {
    registry: TopicRegistry,
    store: Arc<DeviceStateStore>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl IngestionRouter {
    pub fn new(
        registry: TopicRegistry,
        store: Arc<DeviceStateStore>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            registry,
            store,
            broadcaster,
        }
    }

    pub fn registry(&self) -> &TopicRegistry {
        &self.registry
    }

    /// Route one inbound message
    ///
    /// Failures are logged here and returned to the transport adapter; they
    /// never affect other messages.
    pub async fn dispatch(&self, topic: &str, payload: &[u8]) -> IngestResult<DispatchOutcome> {
        if let Err(e) = validate_topic(topic) {
            tracing::warn!(topic = %topic, error = %e, "Rejecting malformed topic");
            return Err(e.into());
        }

        let Some(route) = self.registry.resolve(topic) else {
            tracing::warn!(topic = %topic, "Dropping message on unregistered topic");
            return Err(IngestError::Unrouted(topic.to_string()));
        };

        let kind = route.kind;
        let device_id = route.pattern.extract(topic).map(str::to_string);

        let body = match self.apply(kind, device_id.as_deref(), payload) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(
                    topic = %topic,
                    kind = %kind,
                    payload_bytes = payload.len(),
                    error = %e,
                    "Failed to ingest message"
                );
                return Err(e);
            }
        };

        let group = device_id.as_deref().and_then(|id| kind.device_group(id));
        match group {
            Some(group) => {
                self.broadcaster
                    .broadcast_to_all(kind.event_name(), body.clone())
                    .await;
                self.broadcaster
                    .broadcast_to_group(&group, kind.event_name(), body)
                    .await;
            }
            None => {
                self.broadcaster
                    .broadcast_to_all(kind.event_name(), body)
                    .await;
            }
        }

        tracing::debug!(
            topic = %topic,
            kind = %kind,
            device_id = device_id.as_deref().unwrap_or("-"),
            "Message ingested"
        );

        Ok(DispatchOutcome { kind, device_id })
    }

    /// Decode and store; returns the body to broadcast
    fn apply(&self, kind: MessageKind, id: Option<&str>, payload: &[u8]) -> IngestResult<Value> {
        let store_err = |source| IngestError::Store { kind, source };

        match kind {
            MessageKind::PrinterTelemetry => {
                let mut telemetry: PrinterTelemetry = decode(kind, payload)?;
                bind_id(&mut telemetry.printer_id, id);
                let body = encode(kind, &telemetry)?;
                let key = telemetry.printer_id.clone();
                self.store.upsert_telemetry(&key, telemetry).map_err(store_err)?;
                Ok(body)
            }
            MessageKind::PrinterEvent => {
                let mut event: PrinterEvent = decode(kind, payload)?;
                bind_id(&mut event.printer_id, id);
                let body = encode(kind, &event)?;
                let key = event.printer_id.clone();
                self.store.append_event(&key, event).map_err(store_err)?;
                Ok(body)
            }
            MessageKind::PrintJob => {
                let mut job: PrintJob = decode(kind, payload)?;
                bind_id(&mut job.printer_id, id);
                job.settle();
                let body = encode(kind, &job)?;
                self.store.upsert_job(job).map_err(store_err)?;
                Ok(body)
            }
            MessageKind::EquipmentTelemetry => {
                let mut equipment: EquipmentTelemetry = decode(kind, payload)?;
                bind_id(&mut equipment.equipment_id, id);
                let body = encode(kind, &equipment)?;
                let key = equipment.equipment_id.clone();
                self.store
                    .upsert_equipment(&key, equipment)
                    .map_err(store_err)?;
                Ok(body)
            }
            MessageKind::Message => {
                let message: Message = decode(kind, payload)?;
                tracing::info!(
                    message_id = %message.id,
                    content = message.content.as_deref().unwrap_or(""),
                    "Message received"
                );
                encode(kind, &message)
            }
        }
    }
}

/// The topic's identifier is authoritative over the payload's
fn bind_id(field: &mut String, topic_id: Option<&str>) {
    if let Some(id) = topic_id {
        if field != id {
            *field = id.to_string();
        }
    }
}

fn decode<T: DeserializeOwned>(kind: MessageKind, payload: &[u8]) -> IngestResult<T> {
    serde_json::from_slice(payload).map_err(|source| IngestError::Decode { kind, source })
}

fn encode<T: Serialize>(kind: MessageKind, value: &T) -> IngestResult<Value> {
    serde_json::to_value(value).map_err(|source| IngestError::Encode { kind, source })
}
