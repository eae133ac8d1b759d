//! Dapr Routes
//!
//! - GET /dapr/subscribe - Subscription discovery for the sidecar

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::DaprSubscription;
use crate::api::state::AppState;

/// Route the sidecar delivers subscribed messages to
pub const INBOUND_ROUTE: &str = "/messaging/inbound";

/// GET /dapr/subscribe
///
/// One subscription per registered topic pattern, all delivered to the
/// inbound route. The MQTT component passes `+` wildcards to the broker.
pub async fn subscriptions(State(state): State<Arc<AppState>>) -> Json<Vec<DaprSubscription>> {
    let pubsubname = &state.config.transport.pubsub_name;

    let subscriptions = state
        .router
        .registry()
        .patterns()
        .into_iter()
        .map(|topic| DaprSubscription {
            pubsubname: pubsubname.clone(),
            topic,
            route: INBOUND_ROUTE.to_string(),
        })
        .collect();

    Json(subscriptions)
}
