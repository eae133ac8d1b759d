//! Fan-out boundary used by the ingestion path

use async_trait::async_trait;
use serde_json::Value;

/// Pushes a decoded update to connected observers
///
/// Implementations must be best-effort: a slow or disconnected observer is
/// handled (and logged) inside the implementation and never surfaces to the
/// caller.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Every connected observer
    async fn broadcast_to_all(&self, event: &str, payload: Value);

    /// Only the observers that joined `group` (e.g. `printer:printer-7`)
    async fn broadcast_to_group(&self, group: &str, event: &str, payload: Value);
}
