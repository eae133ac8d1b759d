//! Device Queries
//!
//! Read-only accessors the HTTP layer uses: latest snapshots, recent events,
//! job and equipment lookups, and aggregate counts for health reporting.

mod facade;

pub use facade::{DeviceList, HealthSummary, QueryFacade};
