//! Topic Registration Table
//!
//! The set of `(TopicPattern, MessageKind)` routes the ingestion path accepts.
//! The table is built explicitly at startup and rejects overlapping patterns,
//! so at most one route can ever match a concrete topic.

use serde::Serialize;
use std::fmt;

use super::error::{TopicError, TopicResult};
use super::pattern::TopicPattern;

/// Default hierarchical prefix for lab devices
pub const DEFAULT_PREFIX: &str = "university/lab";

/// Generic message topic kept from the first version of the bridge
pub const GENERIC_TOPIC: &str = "new-orders";

/// The message type a route decodes into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    PrinterTelemetry,
    PrinterEvent,
    PrintJob,
    EquipmentTelemetry,
    Message,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::PrinterTelemetry => "printer_telemetry",
            MessageKind::PrinterEvent => "printer_event",
            MessageKind::PrintJob => "print_job",
            MessageKind::EquipmentTelemetry => "equipment_telemetry",
            MessageKind::Message => "message",
        }
    }

    /// Event name used when fanning the decoded message out to observers
    pub fn event_name(&self) -> &'static str {
        match self {
            MessageKind::PrinterTelemetry => "telemetry",
            MessageKind::PrinterEvent => "event",
            MessageKind::PrintJob => "job",
            MessageKind::EquipmentTelemetry => "equipment",
            MessageKind::Message => "message",
        }
    }

    /// Observer group that receives targeted updates for one device,
    /// e.g. `printer:printer-7`
    pub fn device_group(&self, id: &str) -> Option<String> {
        match self {
            MessageKind::PrinterTelemetry | MessageKind::PrinterEvent | MessageKind::PrintJob => {
                Some(format!("printer:{}", id))
            }
            MessageKind::EquipmentTelemetry => Some(format!("equipment:{}", id)),
            MessageKind::Message => None,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single registered route
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub pattern: TopicPattern,
    pub kind: MessageKind,
}

/// Topic names derived from the configured prefix
#[derive(Debug, Clone)]
pub struct TopicScheme {
    prefix: String,
}

impl TopicScheme {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn printer_telemetry(&self) -> String {
        format!("{}/printer/+/telemetry", self.prefix)
    }

    pub fn printer_events(&self) -> String {
        format!("{}/printer/+/events", self.prefix)
    }

    pub fn printer_jobs(&self) -> String {
        format!("{}/printer/+/jobs", self.prefix)
    }

    pub fn equipment_telemetry(&self) -> String {
        format!("{}/equipment/+/telemetry", self.prefix)
    }

    pub fn printer_commands(&self) -> String {
        format!("{}/printer/+/commands", self.prefix)
    }
}

impl Default for TopicScheme {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

/// Immutable routing table
#[derive(Debug, Clone, Default)]
pub struct TopicRegistry {
    routes: Vec<Route>,
}

/// Builder collecting routes before validation
#[derive(Debug, Default)]
pub struct TopicRegistryBuilder {
    entries: Vec<(String, MessageKind)>,
}

impl TopicRegistryBuilder {
    /// Register a pattern for a message kind
    pub fn route(mut self, pattern: impl Into<String>, kind: MessageKind) -> Self {
        self.entries.push((pattern.into(), kind));
        self
    }

    /// Parse every pattern and reject overlapping registrations
    pub fn build(self) -> TopicResult<TopicRegistry> {
        let mut routes: Vec<Route> = Vec::with_capacity(self.entries.len());

        for (raw, kind) in self.entries {
            let pattern = TopicPattern::parse(&raw)?;

            if let Some(existing) = routes.iter().find(|r| r.pattern.overlaps(&pattern)) {
                return Err(TopicError::Overlap {
                    first: existing.pattern.to_string(),
                    second: pattern.to_string(),
                });
            }

            routes.push(Route { pattern, kind });
        }

        Ok(TopicRegistry { routes })
    }
}

impl TopicRegistry {
    pub fn builder() -> TopicRegistryBuilder {
        TopicRegistryBuilder::default()
    }

    /// The standard lab table: printer telemetry/events/jobs, equipment
    /// telemetry and the generic message topic
    pub fn lab_defaults(scheme: &TopicScheme) -> TopicResult<Self> {
        Self::builder()
            .route(scheme.printer_telemetry(), MessageKind::PrinterTelemetry)
            .route(scheme.printer_events(), MessageKind::PrinterEvent)
            .route(scheme.printer_jobs(), MessageKind::PrintJob)
            .route(scheme.equipment_telemetry(), MessageKind::EquipmentTelemetry)
            .route(GENERIC_TOPIC, MessageKind::Message)
            .build()
    }

    /// First route matching the concrete topic
    pub fn resolve(&self, topic: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.pattern.matches(topic))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Registered pattern strings, in registration order
    pub fn patterns(&self) -> Vec<String> {
        self.routes.iter().map(|r| r.pattern.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lab_defaults() {
        let registry = TopicRegistry::lab_defaults(&TopicScheme::default()).unwrap();
        assert_eq!(registry.len(), 5);
        assert_eq!(
            registry.patterns(),
            vec![
                "university/lab/printer/+/telemetry",
                "university/lab/printer/+/events",
                "university/lab/printer/+/jobs",
                "university/lab/equipment/+/telemetry",
                "new-orders",
            ]
        );
    }

    #[test]
    fn test_device_groups() {
        assert_eq!(
            MessageKind::PrintJob.device_group("printer-7").as_deref(),
            Some("printer:printer-7")
        );
        assert_eq!(
            MessageKind::EquipmentTelemetry.device_group("mill-1").as_deref(),
            Some("equipment:mill-1")
        );
        assert_eq!(MessageKind::Message.device_group("x"), None);
    }

    #[test]
    fn test_resolve() {
        let registry = TopicRegistry::lab_defaults(&TopicScheme::default()).unwrap();

        let route = registry
            .resolve("university/lab/printer/printer-3/events")
            .unwrap();
        assert_eq!(route.kind, MessageKind::PrinterEvent);

        let route = registry
            .resolve("university/lab/equipment/mill-1/telemetry")
            .unwrap();
        assert_eq!(route.kind, MessageKind::EquipmentTelemetry);

        assert!(registry.resolve("university/lab/printer/p1/commands").is_none());
        assert!(registry.resolve("somewhere/else").is_none());
    }

    #[test]
    fn test_overlap_rejected_at_build() {
        let result = TopicRegistry::builder()
            .route("lab/printer/+/telemetry", MessageKind::PrinterTelemetry)
            .route("lab/printer/special/telemetry", MessageKind::EquipmentTelemetry)
            .build();

        assert!(matches!(result, Err(TopicError::Overlap { .. })));
    }

    #[test]
    fn test_invalid_pattern_rejected_at_build() {
        let result = TopicRegistry::builder()
            .route("", MessageKind::Message)
            .build();
        assert_eq!(result.unwrap_err(), TopicError::Empty);
    }

    #[test]
    fn test_scheme_trims_trailing_delimiter() {
        let scheme = TopicScheme::new("campus/lab/");
        assert_eq!(scheme.prefix(), "campus/lab");
        assert_eq!(scheme.printer_commands(), "campus/lab/printer/+/commands");
    }

    #[test]
    fn test_event_names() {
        assert_eq!(MessageKind::PrinterTelemetry.event_name(), "telemetry");
        assert_eq!(MessageKind::PrinterEvent.to_string(), "printer_event");
    }
}
