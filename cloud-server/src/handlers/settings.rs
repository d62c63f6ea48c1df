//! Threshold settings handlers

use axum::extract::{Path, State};
use axum::Json;

use guardian_core::logic::threshold::ThresholdUpdate;
use guardian_core::{SubjectId, ThresholdConfig};

use crate::{AppResult, AppState};

/// Current thresholds for a subject (defaults when never customized).
pub async fn get(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
) -> AppResult<Json<ThresholdConfig>> {
    Ok(Json(state.settings.get(subject_id)?))
}

/// Partial update; the merged config must keep low < high everywhere.
pub async fn update(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
    Json(req): Json<ThresholdUpdate>,
) -> AppResult<Json<ThresholdConfig>> {
    Ok(Json(state.settings.update(subject_id, &req)?))
}

/// Back to the clinical defaults.
pub async fn reset(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
) -> AppResult<Json<ThresholdConfig>> {
    Ok(Json(state.settings.reset(subject_id)?))
}
