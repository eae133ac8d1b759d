//! Printer Routes
//!
//! - GET /api/v1/printers - Latest telemetry of every printer
//! - GET /api/v1/printers/:id/telemetry - Latest telemetry of one printer
//! - GET /api/v1/printers/:id/events - Recent events, newest first
//! - GET /api/v1/printers/:id/jobs - Jobs reported by one printer
//! - POST /api/v1/printers/:id/commands - Send a command to a printer

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CommandResponse, EventListResponse, EventsQuery, JobListResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::query::DeviceList;
use crate::store::{PrinterCommand, PrinterTelemetry, DEFAULT_EVENT_LIMIT};

/// Upper bound for `?limit=`
const MAX_EVENT_LIMIT: usize = 1000;

/// GET /api/v1/printers
pub async fn list_printers(State(state): State<Arc<AppState>>) -> Json<DeviceList> {
    Json(state.facade.list_devices())
}

/// GET /api/v1/printers/:id/telemetry
pub async fn get_telemetry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PrinterTelemetry>> {
    state
        .facade
        .telemetry(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No telemetry for printer '{}'", id)))
}

/// GET /api/v1/printers/:id/events?limit=N
///
/// An unknown printer has no events; that is an empty list, not a 404.
pub async fn get_events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<Json<EventListResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_EVENT_LIMIT);
    if limit > MAX_EVENT_LIMIT {
        return Err(ApiError::Validation(format!(
            "limit must be at most {}",
            MAX_EVENT_LIMIT
        )));
    }

    let events = state.facade.events(&id, limit);
    Ok(Json(EventListResponse {
        printer_id: id,
        total: events.len(),
        events,
    }))
}

/// GET /api/v1/printers/:id/jobs
pub async fn get_printer_jobs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<JobListResponse> {
    let jobs = state.facade.jobs_for_printer(&id);
    Json(JobListResponse {
        total: jobs.len(),
        jobs,
    })
}

/// POST /api/v1/printers/:id/commands
///
/// Returns 202 once the transport accepts the publish; the printer does not
/// acknowledge.
pub async fn send_command(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(command): Json<PrinterCommand>,
) -> ApiResult<(StatusCode, Json<CommandResponse>)> {
    let topic = state.dispatcher.send_command(&id, &command).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(CommandResponse {
            status: "accepted".to_string(),
            printer_id: id,
            action: command.action.to_string(),
            topic,
        }),
    ))
}
