//! Reading ingest, history and realtime status handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use guardian_core::logic::stats::{weekly_stats, WeeklyStats};
use guardian_core::logic::status::{build_status, placeholder_status, StatusView};
use guardian_core::{assess, RiskAssessment, SubjectId, VitalReading};

use crate::{AppError, AppResult, AppState};

/// Battery reporting is a device concern outside this backend; the status
/// payload carries a fixed placeholder.
pub(crate) const BATTERY_PLACEHOLDER: i32 = 85;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecordRequest {
    pub subject_id: SubjectId,
    #[validate(range(min = 20, max = 250))]
    pub heart_rate: i32,
    #[validate(range(min = 60, max = 250))]
    pub systolic_bp: i32,
    #[validate(range(min = 40, max = 150))]
    pub diastolic_bp: i32,
    #[validate(range(min = 0, max = 100_000))]
    pub steps: i32,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    /// Defaults to the ingest time
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CreateRecordResponse {
    pub record_id: i64,
    pub assessment: RiskAssessment,
    pub alert_created: bool,
}

/// Ingest one reading and run the full assessment pipeline on it.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateRecordRequest>,
) -> AppResult<Json<CreateRecordResponse>> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let reading = VitalReading {
        subject_id: req.subject_id,
        heart_rate: req.heart_rate,
        systolic_bp: req.systolic_bp,
        diastolic_bp: req.diastolic_bp,
        steps: req.steps,
        latitude: req.latitude,
        longitude: req.longitude,
        timestamp: req.timestamp.unwrap_or_else(Utc::now),
    };
    reading.validate()?;

    let record_id = state.records.insert(&reading)?;

    let assessment = assess_reading(&state, &reading)?;
    let alert = state.alerts.consider(reading.subject_id, &assessment)?;

    Ok(Json(CreateRecordResponse {
        record_id,
        assessment,
        alert_created: alert.is_some(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// Recent readings, newest first.
pub async fn list(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<VitalReading>>> {
    let limit = query.limit.unwrap_or(50).min(500);
    Ok(Json(state.records.list(subject_id, limit)?))
}

/// Latest reading.
pub async fn latest(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
) -> AppResult<Json<VitalReading>> {
    state
        .records
        .latest(subject_id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("暂无健康数据".to_string()))
}

/// Realtime status for the guardian dashboard.
pub async fn realtime_status(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
) -> AppResult<Json<StatusView>> {
    let reading = match state.records.latest(subject_id)? {
        Some(r) => r,
        None => return Ok(Json(placeholder_status(BATTERY_PLACEHOLDER))),
    };

    let assessment = assess_reading(&state, &reading)?;
    Ok(Json(build_status(
        &reading,
        &assessment,
        BATTERY_PLACEHOLDER,
        Utc::now(),
    )))
}

/// Per-day aggregates over the last seven days.
pub async fn weekly(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
) -> AppResult<Json<WeeklyStats>> {
    let since = Utc::now() - Duration::days(7);
    let records = state.records.since(subject_id, since)?;
    Ok(Json(weekly_stats(&records)))
}

/// One assessment with the subject's config, profile and zones in place.
pub(crate) fn assess_reading(
    state: &AppState,
    reading: &VitalReading,
) -> AppResult<RiskAssessment> {
    let config = state.settings.get(reading.subject_id)?;
    let profile = state.learner.profile(reading.subject_id)?;
    let zones = super::active_zones(state, reading.subject_id)?;

    Ok(assess(reading, &config, profile.as_ref(), &zones)?)
}
