//! Device State Store
//!
//! The authoritative in-memory view of every device. Four lock-striped maps
//! (`DashMap`) hold the latest printer telemetry, per-printer event logs,
//! print jobs and equipment telemetry. Each value is replaced whole under its
//! shard lock, so readers never see a half-written snapshot, and unrelated
//! devices never contend on a single global lock.
//!
//! All methods are synchronous; no shard lock can be held across an `.await`.

use dashmap::DashMap;
use std::collections::VecDeque;

use super::error::{StoreError, StoreResult};
use super::types::{EquipmentTelemetry, PrintJob, PrinterEvent, PrinterTelemetry};

/// Default number of events returned by [`DeviceStateStore::events`]
pub const DEFAULT_EVENT_LIMIT: usize = 50;

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum events retained per device; the oldest is evicted first.
    /// `0` keeps every event.
    pub max_events_per_device: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_events_per_device: 1000,
        }
    }
}

/// Concurrent per-device state
#[derive(Debug, Default)]
pub struct DeviceStateStore {
    telemetry: DashMap<String, PrinterTelemetry>,
    events: DashMap<String, VecDeque<PrinterEvent>>,
    jobs: DashMap<String, PrintJob>,
    equipment: DashMap<String, EquipmentTelemetry>,
    config: StoreConfig,
}

impl DeviceStateStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            telemetry: DashMap::new(),
            events: DashMap::new(),
            jobs: DashMap::new(),
            equipment: DashMap::new(),
            config,
        }
    }

    // ============================================
    // Printer telemetry
    // ============================================

    /// Replace the snapshot for `device_id`
    ///
    /// Last writer wins; timestamps are not compared.
    pub fn upsert_telemetry(&self, device_id: &str, snapshot: PrinterTelemetry) -> StoreResult<()> {
        ensure_id(device_id)?;
        self.telemetry.insert(device_id.to_string(), snapshot);
        Ok(())
    }

    pub fn telemetry(&self, device_id: &str) -> Option<PrinterTelemetry> {
        self.telemetry.get(device_id).map(|entry| entry.value().clone())
    }

    /// Every printer snapshot, ordered by device id
    pub fn all_telemetry(&self) -> Vec<PrinterTelemetry> {
        let mut snapshots: Vec<PrinterTelemetry> =
            self.telemetry.iter().map(|e| e.value().clone()).collect();
        snapshots.sort_by(|a, b| a.printer_id.cmp(&b.printer_id));
        snapshots
    }

    /// Number of printers with telemetry
    pub fn device_count(&self) -> usize {
        self.telemetry.len()
    }

    /// Number of printers whose latest status is printing
    pub fn printing_count(&self) -> usize {
        self.telemetry.iter().filter(|e| e.value().is_printing()).count()
    }

    // ============================================
    // Printer events
    // ============================================

    /// Append to the device's event log, creating it on first use
    ///
    /// The log is created through the map's entry API while holding the
    /// shard lock, so concurrent first events for one device share a log.
    pub fn append_event(&self, device_id: &str, event: PrinterEvent) -> StoreResult<()> {
        ensure_id(device_id)?;

        let mut log = self.events.entry(device_id.to_string()).or_default();
        log.push_back(event);

        let cap = self.config.max_events_per_device;
        if cap > 0 {
            while log.len() > cap {
                log.pop_front();
            }
        }

        Ok(())
    }

    /// Most recent events first, at most `limit`
    ///
    /// Unknown devices yield an empty list.
    pub fn events(&self, device_id: &str, limit: usize) -> Vec<PrinterEvent> {
        self.events
            .get(device_id)
            .map(|log| log.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Events currently retained across all devices
    pub fn total_event_count(&self) -> usize {
        self.events.iter().map(|log| log.len()).sum()
    }

    // ============================================
    // Print jobs
    // ============================================

    pub fn upsert_job(&self, job: PrintJob) -> StoreResult<()> {
        ensure_id(&job.job_id)?;
        self.jobs.insert(job.job_id.clone(), job);
        Ok(())
    }

    pub fn job(&self, job_id: &str) -> Option<PrintJob> {
        self.jobs.get(job_id).map(|entry| entry.value().clone())
    }

    /// Jobs for one printer, newest first
    pub fn jobs_for_printer(&self, printer_id: &str) -> Vec<PrintJob> {
        let mut jobs: Vec<PrintJob> = self
            .jobs
            .iter()
            .filter(|e| e.value().printer_id == printer_id)
            .map(|e| e.value().clone())
            .collect();
        jobs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        jobs
    }

    /// All jobs, newest first
    pub fn all_jobs(&self) -> Vec<PrintJob> {
        let mut jobs: Vec<PrintJob> = self.jobs.iter().map(|e| e.value().clone()).collect();
        jobs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        jobs
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    // ============================================
    // Lab equipment
    // ============================================

    pub fn upsert_equipment(
        &self,
        equipment_id: &str,
        snapshot: EquipmentTelemetry,
    ) -> StoreResult<()> {
        ensure_id(equipment_id)?;
        self.equipment.insert(equipment_id.to_string(), snapshot);
        Ok(())
    }

    pub fn equipment(&self, equipment_id: &str) -> Option<EquipmentTelemetry> {
        self.equipment
            .get(equipment_id)
            .map(|entry| entry.value().clone())
    }

    /// Every equipment snapshot, ordered by equipment id
    pub fn all_equipment(&self) -> Vec<EquipmentTelemetry> {
        let mut snapshots: Vec<EquipmentTelemetry> =
            self.equipment.iter().map(|e| e.value().clone()).collect();
        snapshots.sort_by(|a, b| a.equipment_id.cmp(&b.equipment_id));
        snapshots
    }

    pub fn equipment_count(&self) -> usize {
        self.equipment.len()
    }
}

fn ensure_id(id: &str) -> StoreResult<()> {
    if id.is_empty() {
        Err(StoreError::EmptyId)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::{EventKind, JobStatus, PrinterStatus};
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn printing(id: &str, progress: f64) -> PrinterTelemetry {
        PrinterTelemetry::new(id, PrinterStatus::Printing).progress(progress)
    }

    #[test]
    fn test_read_your_write() {
        let store = DeviceStateStore::default();
        let snapshot = printing("printer-1", 12.0);

        store.upsert_telemetry("printer-1", snapshot.clone()).unwrap();
        assert_eq!(store.telemetry("printer-1"), Some(snapshot));
    }

    #[test]
    fn test_upsert_overwrites() {
        let store = DeviceStateStore::default();
        store.upsert_telemetry("printer-7", printing("printer-7", 42.0)).unwrap();
        store.upsert_telemetry("printer-7", printing("printer-7", 55.0)).unwrap();

        let latest = store.telemetry("printer-7").unwrap();
        assert_eq!(latest.print_progress, 55.0);
        assert_eq!(store.device_count(), 1);
    }

    #[test]
    fn test_out_of_order_telemetry_last_write_wins() {
        let store = DeviceStateStore::default();
        let newer = printing("p1", 80.0);
        let mut older = printing("p1", 20.0);
        older.timestamp = newer.timestamp - Duration::minutes(5);

        store.upsert_telemetry("p1", newer).unwrap();
        store.upsert_telemetry("p1", older).unwrap();

        assert_eq!(store.telemetry("p1").unwrap().print_progress, 20.0);
    }

    #[test]
    fn test_unknown_device() {
        let store = DeviceStateStore::default();
        assert!(store.telemetry("unknown-id").is_none());
        assert!(store.events("unknown-id", 50).is_empty());
    }

    #[test]
    fn test_empty_id_rejected() {
        let store = DeviceStateStore::default();
        assert_eq!(
            store.upsert_telemetry("", printing("", 1.0)),
            Err(StoreError::EmptyId)
        );
        assert_eq!(
            store.append_event("", PrinterEvent::new("", EventKind::Info, "x")),
            Err(StoreError::EmptyId)
        );
        assert_eq!(store.device_count(), 0);
        assert_eq!(store.total_event_count(), 0);
    }

    #[test]
    fn test_events_most_recent_first() {
        let store = DeviceStateStore::default();
        store
            .append_event("printer-3", PrinterEvent::new("printer-3", EventKind::Error, "nozzle jam"))
            .unwrap();
        store
            .append_event("printer-3", PrinterEvent::new("printer-3", EventKind::Completed, "done"))
            .unwrap();

        let events = store.events("printer-3", DEFAULT_EVENT_LIMIT);
        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Completed, EventKind::Error]);
    }

    #[test]
    fn test_events_limit() {
        let store = DeviceStateStore::default();
        for i in 0..10 {
            store
                .append_event("p1", PrinterEvent::new("p1", EventKind::Info, format!("e{}", i)))
                .unwrap();
        }

        let events = store.events("p1", 3);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].message, "e9");
        assert_eq!(events[2].message, "e7");
        assert!(store.events("p1", 0).is_empty());
    }

    #[test]
    fn test_events_keep_arrival_order_not_timestamp_order() {
        let store = DeviceStateStore::default();
        let now = Utc::now();
        store
            .append_event("p1", PrinterEvent::new("p1", EventKind::Info, "late").at(now))
            .unwrap();
        store
            .append_event(
                "p1",
                PrinterEvent::new("p1", EventKind::Info, "early").at(now - Duration::hours(1)),
            )
            .unwrap();

        let events = store.events("p1", 10);
        assert_eq!(events[0].message, "early");
        assert_eq!(events[1].message, "late");
    }

    #[test]
    fn test_event_log_capped() {
        let store = DeviceStateStore::new(StoreConfig {
            max_events_per_device: 3,
        });
        for i in 0..5 {
            store
                .append_event("p1", PrinterEvent::new("p1", EventKind::Info, format!("e{}", i)))
                .unwrap();
        }

        let events = store.events("p1", 50);
        let messages: Vec<&str> = events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["e4", "e3", "e2"]);
        assert_eq!(store.total_event_count(), 3);
    }

    #[test]
    fn test_event_log_unbounded_when_cap_zero() {
        let store = DeviceStateStore::new(StoreConfig {
            max_events_per_device: 0,
        });
        for i in 0..2500 {
            store
                .append_event("p1", PrinterEvent::new("p1", EventKind::Info, format!("e{}", i)))
                .unwrap();
        }
        assert_eq!(store.total_event_count(), 2500);
    }

    #[test]
    fn test_concurrent_appends_across_devices() {
        let store = Arc::new(DeviceStateStore::new(StoreConfig {
            max_events_per_device: 0,
        }));
        let devices = 8;
        let per_device = 200;

        let handles: Vec<_> = (0..devices)
            .flat_map(|d| {
                // Two writers per device race on the first append
                (0..2).map(move |w| (d, w))
            })
            .map(|(d, w)| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let id = format!("printer-{}", d);
                    for i in 0..per_device {
                        let msg = format!("w{}-{}", w, i);
                        store
                            .append_event(&id, PrinterEvent::new(&id, EventKind::Info, msg))
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.total_event_count(), devices * per_device * 2);

        for d in 0..devices {
            let id = format!("printer-{}", d);
            let events = store.events(&id, usize::MAX);
            assert_eq!(events.len(), per_device * 2);
            assert!(events.iter().all(|e| e.printer_id == id));

            // Each writer's events appear in the order it appended them
            for w in 0..2 {
                let prefix = format!("w{}-", w);
                let seq: Vec<usize> = events
                    .iter()
                    .rev()
                    .filter_map(|e| e.message.strip_prefix(&prefix))
                    .map(|n| n.parse().unwrap())
                    .collect();
                assert_eq!(seq, (0..per_device).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_jobs() {
        let store = DeviceStateStore::default();
        let job = PrintJob::new("printer-1", "benchy.gcode");
        let job_id = job.job_id.clone();

        store.upsert_job(job.clone()).unwrap();
        store
            .upsert_job(job.clone().status(JobStatus::Printing))
            .unwrap();
        store
            .upsert_job(PrintJob::new("printer-2", "vase.gcode"))
            .unwrap();

        assert_eq!(store.job(&job_id).unwrap().status, JobStatus::Printing);
        assert_eq!(store.jobs_for_printer("printer-1").len(), 1);
        assert_eq!(store.all_jobs().len(), 2);
        assert_eq!(store.job_count(), 2);
        assert!(store.job("missing").is_none());
    }

    #[test]
    fn test_equipment() {
        let store = DeviceStateStore::default();
        store
            .upsert_equipment("mill-1", EquipmentTelemetry::new("mill-1", "cnc_mill", "running"))
            .unwrap();
        store
            .upsert_equipment("laser-1", EquipmentTelemetry::new("laser-1", "laser_cutter", "idle"))
            .unwrap();

        assert_eq!(store.equipment("mill-1").unwrap().status, "running");
        let ids: Vec<String> = store
            .all_equipment()
            .into_iter()
            .map(|e| e.equipment_id)
            .collect();
        assert_eq!(ids, vec!["laser-1", "mill-1"]);
        assert_eq!(store.equipment_count(), 2);
    }

    #[test]
    fn test_printing_count() {
        let store = DeviceStateStore::default();
        store.upsert_telemetry("p1", printing("p1", 10.0)).unwrap();
        store.upsert_telemetry("p2", printing("p2", 90.0)).unwrap();
        store
            .upsert_telemetry("p3", PrinterTelemetry::new("p3", PrinterStatus::Idle))
            .unwrap();
        assert_eq!(store.printing_count(), 2);

        store
            .upsert_telemetry("p2", PrinterTelemetry::new("p2", PrinterStatus::Idle))
            .unwrap();
        assert_eq!(store.printing_count(), 1);
        assert_eq!(store.device_count(), 3);
    }
}
