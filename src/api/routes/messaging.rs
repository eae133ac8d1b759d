//! Messaging Routes
//!
//! - POST /messaging/publish - Publish a user message to a topic
//! - POST /messaging/inbound - Dapr delivery of subscribed topics

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{CloudEvent, InboundResponse, PublishRequest, PublishResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::topic::GENERIC_TOPIC;

/// POST /messaging/publish
///
/// Publishes the message on `topic`, or on the generic topic when omitted.
pub async fn publish_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PublishRequest>,
) -> ApiResult<Json<PublishResponse>> {
    let topic = req.topic.unwrap_or_else(|| GENERIC_TOPIC.to_string());

    tracing::info!(
        topic = %topic,
        message_id = %req.message.id,
        content = req.message.content.as_deref().unwrap_or(""),
        "Publishing message"
    );

    state.dispatcher.publish(&topic, &req.message).await?;

    Ok(Json(PublishResponse {
        status: "Message published successfully!".to_string(),
        topic,
        message_id: req.message.id,
    }))
}

/// POST /messaging/inbound
///
/// Called by the Dapr sidecar for every message on a subscribed topic.
/// A 404 (unrouted) makes the sidecar drop the message.
pub async fn receive_inbound(
    State(state): State<Arc<AppState>>,
    Json(event): Json<CloudEvent>,
) -> ApiResult<Json<InboundResponse>> {
    tracing::debug!(
        topic = %event.topic,
        event_id = event.id.as_deref().unwrap_or("-"),
        pubsub = event.pubsubname.as_deref().unwrap_or("-"),
        "Inbound message"
    );

    state
        .router
        .dispatch(&event.topic, &event.payload_bytes())
        .await?;

    Ok(Json(InboundResponse {
        status: "SUCCESS".to_string(),
    }))
}
