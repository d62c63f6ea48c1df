//! Alert stream handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use guardian_core::{Alert, SubjectId};

use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// Alerts for a subject, newest first.
pub async fn list(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Alert>>> {
    let limit = query.limit.unwrap_or(20).min(200);
    Ok(Json(state.alerts.list(subject_id, limit)?))
}

/// Unread alert count, drives the guardian badge.
pub async fn unread_count(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
) -> AppResult<Json<Value>> {
    let count = state.alerts.unread_count(subject_id)?;
    Ok(Json(json!({ "unread_count": count })))
}

/// Mark one alert read. Idempotent: re-marking is a no-op, not an error.
pub async fn mark_read(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    if !state.alerts.mark_read(alert_id)? {
        return Err(AppError::NotFound("Alert not found".to_string()));
    }
    Ok(Json(json!({
        "message": "Alert marked as read",
        "alert_id": alert_id,
    })))
}

/// Mark every unread alert for a subject read.
pub async fn mark_all_read(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
) -> AppResult<Json<Value>> {
    let marked = state.alerts.mark_all_read(subject_id)?;
    Ok(Json(json!({ "message": format!("Marked {} alerts as read", marked) })))
}
