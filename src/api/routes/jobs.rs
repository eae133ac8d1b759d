//! Job Routes
//!
//! - GET /api/v1/jobs - All known print jobs, newest first
//! - GET /api/v1/jobs/:id - One print job

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::JobListResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::store::PrintJob;

/// GET /api/v1/jobs
pub async fn list_jobs(State(state): State<Arc<AppState>>) -> Json<JobListResponse> {
    let jobs = state.facade.list_jobs();
    Json(JobListResponse {
        total: jobs.len(),
        jobs,
    })
}

/// GET /api/v1/jobs/:id
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PrintJob>> {
    state
        .facade
        .job(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Print job '{}' not found", id)))
}
