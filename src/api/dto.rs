//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::query::HealthSummary;
use crate::store::{EquipmentTelemetry, Message, PrintJob, PrinterEvent};

// ============================================
// MESSAGING DTOs
// ============================================

/// Publish request: a message for a topic (defaults to the generic topic)
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub topic: Option<String>,
    pub message: Message,
}

/// Publish response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub status: String,
    pub topic: String,
    pub message_id: Uuid,
}

/// CloudEvent envelope delivered by the Dapr sidecar
///
/// Only the fields the router needs are read; the rest are ignored.
#[derive(Debug, Deserialize)]
pub struct CloudEvent {
    #[serde(default)]
    pub id: Option<String>,
    pub topic: String,
    #[serde(default)]
    pub pubsubname: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl CloudEvent {
    /// Raw payload bytes for the router
    ///
    /// String data is passed through as-is so publishers that send JSON
    /// text instead of a JSON object still decode.
    pub fn payload_bytes(&self) -> Vec<u8> {
        match &self.data {
            Value::String(text) => text.as_bytes().to_vec(),
            other => other.to_string().into_bytes(),
        }
    }
}

/// Acknowledgement returned to the sidecar
#[derive(Debug, Serialize, Deserialize)]
pub struct InboundResponse {
    /// "SUCCESS" when the message was applied
    pub status: String,
}

/// One entry of the Dapr subscription discovery list
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DaprSubscription {
    pub pubsubname: String,
    pub topic: String,
    pub route: String,
}

// ============================================
// DEVICE DTOs
// ============================================

/// Query parameters for event listing
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Recent events for one printer, newest first
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    pub printer_id: String,
    pub total: usize,
    pub events: Vec<PrinterEvent>,
}

/// Command accepted for publish
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub status: String,
    pub printer_id: String,
    pub action: String,
    pub topic: String,
}

/// Print job listing
#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub total: usize,
    pub jobs: Vec<PrintJob>,
}

/// Lab equipment listing
#[derive(Debug, Serialize)]
pub struct EquipmentListResponse {
    pub total: usize,
    pub equipment: Vec<EquipmentTelemetry>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// "healthy" or "degraded" (transport unreachable)
    pub status: String,
    /// "ok" or "error"
    pub transport: String,
    pub uptime_seconds: u64,
    pub version: String,
    #[serde(flatten)]
    pub summary: HealthSummary,
}
