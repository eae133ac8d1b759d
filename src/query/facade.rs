//! Query Facade
//!
//! Read-only views over the device state store for the HTTP surface. Absent
//! devices are `None`, never errors.

use serde::Serialize;
use std::sync::Arc;

use crate::store::{
    DeviceStateStore, EquipmentTelemetry, PrintJob, PrinterEvent, PrinterTelemetry,
};
use crate::websocket::ConnectionHub;

/// Printer list with aggregate counts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceList {
    pub total: usize,
    pub printing: usize,
    pub devices: Vec<PrinterTelemetry>,
}

/// Live counters plus the registered topic patterns
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    pub registered_topics: Vec<String>,
    pub connected_devices: usize,
    pub printing_devices: usize,
    pub total_events: usize,
    pub equipment: usize,
    pub jobs: usize,
    pub observers: usize,
}

pub struct QueryFacade {
    store: Arc<DeviceStateStore>,
    registered_topics: Vec<String>,
    hub: Arc<ConnectionHub>,
}

impl QueryFacade {
    pub fn new(
        store: Arc<DeviceStateStore>,
        registered_topics: Vec<String>,
        hub: Arc<ConnectionHub>,
    ) -> Self {
        Self {
            store,
            registered_topics,
            hub,
        }
    }

    pub fn device_count(&self) -> usize {
        self.store.device_count()
    }

    /// Printers whose latest status is `printing`
    pub fn printing_count(&self) -> usize {
        self.store.printing_count()
    }

    pub fn telemetry(&self, device_id: &str) -> Option<PrinterTelemetry> {
        self.store.telemetry(device_id)
    }

    pub fn events(&self, device_id: &str, limit: usize) -> Vec<PrinterEvent> {
        self.store.events(device_id, limit)
    }

    pub fn list_devices(&self) -> DeviceList {
        let devices = self.store.all_telemetry();
        let printing = devices.iter().filter(|t| t.is_printing()).count();
        DeviceList {
            total: devices.len(),
            printing,
            devices,
        }
    }

    pub fn job(&self, job_id: &str) -> Option<PrintJob> {
        self.store.job(job_id)
    }

    pub fn jobs_for_printer(&self, printer_id: &str) -> Vec<PrintJob> {
        self.store.jobs_for_printer(printer_id)
    }

    pub fn list_jobs(&self) -> Vec<PrintJob> {
        self.store.all_jobs()
    }

    pub fn equipment(&self, equipment_id: &str) -> Option<EquipmentTelemetry> {
        self.store.equipment(equipment_id)
    }

    pub fn list_equipment(&self) -> Vec<EquipmentTelemetry> {
        self.store.all_equipment()
    }

    pub async fn health(&self) -> HealthSummary {
        HealthSummary {
            registered_topics: self.registered_topics.clone(),
            connected_devices: self.store.device_count(),
            printing_devices: self.store.printing_count(),
            total_events: self.store.total_event_count(),
            equipment: self.store.equipment_count(),
            jobs: self.store.job_count(),
            observers: self.hub.connection_count().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{EventKind, JobStatus, PrinterStatus};
    use crate::websocket::HubConfig;

    fn facade() -> (QueryFacade, Arc<DeviceStateStore>, Arc<ConnectionHub>) {
        let store = Arc::new(DeviceStateStore::default());
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        let facade = QueryFacade::new(
            Arc::clone(&store),
            vec!["university/lab/printer/+/telemetry".to_string()],
            Arc::clone(&hub),
        );
        (facade, store, hub)
    }

    #[test]
    fn test_counts() {
        let (facade, store, _) = facade();
        store
            .upsert_telemetry("p1", PrinterTelemetry::new("p1", PrinterStatus::Printing))
            .unwrap();
        store
            .upsert_telemetry("p2", PrinterTelemetry::new("p2", PrinterStatus::Idle))
            .unwrap();
        store
            .upsert_telemetry("p3", PrinterTelemetry::new("p3", PrinterStatus::Printing))
            .unwrap();

        assert_eq!(facade.device_count(), 3);
        assert_eq!(facade.printing_count(), 2);

        let list = facade.list_devices();
        assert_eq!(list.total, 3);
        assert_eq!(list.printing, 2);
        assert_eq!(list.devices[0].printer_id, "p1");
    }

    #[test]
    fn test_unknown_device_is_absent() {
        let (facade, _, _) = facade();
        assert!(facade.telemetry("unknown-id").is_none());
        assert!(facade.events("unknown-id", 50).is_empty());
        assert!(facade.equipment("unknown-id").is_none());
        assert!(facade.job("unknown-id").is_none());
    }

    #[tokio::test]
    async fn test_health_summary() {
        let (facade, store, hub) = facade();
        store
            .upsert_telemetry("p1", PrinterTelemetry::new("p1", PrinterStatus::Idle))
            .unwrap();
        store
            .append_event("p1", PrinterEvent::new("p1", EventKind::Info, "a"))
            .unwrap();
        store
            .append_event("p2", PrinterEvent::new("p2", EventKind::Warning, "b"))
            .unwrap();
        store
            .upsert_job(PrintJob::new("p1", "a.gcode").status(JobStatus::Printing))
            .unwrap();
        store
            .upsert_equipment("mill-1", EquipmentTelemetry::new("mill-1", "cnc_mill", "running"))
            .unwrap();
        let (tx, _rx) = hub.channel();
        hub.register(tx).await.unwrap();

        let health = facade.health().await;
        assert_eq!(health.registered_topics.len(), 1);
        assert_eq!(health.connected_devices, 1);
        assert_eq!(health.printing_devices, 0);
        assert_eq!(health.total_events, 2);
        assert_eq!(health.jobs, 1);
        assert_eq!(health.equipment, 1);
        assert_eq!(health.observers, 1);

        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["totalEvents"], 2);
    }
}
