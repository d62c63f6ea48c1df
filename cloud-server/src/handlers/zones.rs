//! Safe-zone management handlers

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use guardian_core::logic::store::ZoneUpdate;
use guardian_core::{SafeZone, SubjectId};

use crate::{AppError, AppResult, AppState};

/// Zones for a subject, seeding the defaults on first access.
pub async fn list(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
) -> AppResult<Json<Vec<SafeZone>>> {
    Ok(Json(state.zones.ensure_seeded(subject_id)?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateZoneRequest {
    #[validate(length(min = 1, max = 64))]
    pub zone_name: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    /// Meters
    #[validate(range(min = 10.0, max = 5000.0))]
    pub radius: f64,
}

pub async fn create(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
    Json(req): Json<CreateZoneRequest>,
) -> AppResult<Json<SafeZone>> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let zone = state.zones.create(
        subject_id,
        &req.zone_name,
        req.latitude,
        req.longitude,
        req.radius,
    )?;
    Ok(Json(zone))
}

pub async fn update(
    State(state): State<AppState>,
    Path((subject_id, zone_id)): Path<(SubjectId, i64)>,
    Json(req): Json<ZoneUpdate>,
) -> AppResult<Json<SafeZone>> {
    state
        .zones
        .update(zone_id, subject_id, &req)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Safe zone not found".to_string()))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((subject_id, zone_id)): Path<(SubjectId, i64)>,
) -> AppResult<Json<Value>> {
    if !state.zones.delete(zone_id, subject_id)? {
        return Err(AppError::NotFound("Safe zone not found".to_string()));
    }
    Ok(Json(json!({ "message": "Safe zone deleted" })))
}

pub async fn toggle(
    State(state): State<AppState>,
    Path((subject_id, zone_id)): Path<(SubjectId, i64)>,
) -> AppResult<Json<Value>> {
    let is_active = state
        .zones
        .toggle(zone_id, subject_id)?
        .ok_or_else(|| AppError::NotFound("Safe zone not found".to_string()))?;
    Ok(Json(json!({
        "message": format!("Safe zone {}", if is_active { "enabled" } else { "disabled" }),
        "is_active": is_active,
    })))
}
