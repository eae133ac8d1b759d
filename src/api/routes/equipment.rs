//! Equipment Routes
//!
//! - GET /api/v1/equipment - Latest telemetry of all lab equipment
//! - GET /api/v1/equipment/:id - Latest telemetry of one device

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::EquipmentListResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::store::EquipmentTelemetry;

/// GET /api/v1/equipment
pub async fn list_equipment(State(state): State<Arc<AppState>>) -> Json<EquipmentListResponse> {
    let equipment = state.facade.list_equipment();
    Json(EquipmentListResponse {
        total: equipment.len(),
        equipment,
    })
}

/// GET /api/v1/equipment/:id
pub async fn get_equipment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<EquipmentTelemetry>> {
    state
        .facade
        .equipment(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Equipment '{}' not found", id)))
}
