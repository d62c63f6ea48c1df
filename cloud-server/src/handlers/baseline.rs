//! Baseline learning and comparison handlers

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use guardian_core::constants::DEFAULT_LEARNING_WINDOW_DAYS;
use guardian_core::logic::baseline::compare;
use guardian_core::{HealthProfile, SubjectId};

use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct LearnRequest {
    pub subject_id: SubjectId,
    /// History window in days
    #[validate(range(min = 1, max = 90))]
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LearnResponse {
    pub profile: HealthProfile,
}

/// Trigger a full learning run over the subject's recent history.
pub async fn learn(
    State(state): State<AppState>,
    Json(req): Json<LearnRequest>,
) -> AppResult<Json<LearnResponse>> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let days = req.days.unwrap_or(DEFAULT_LEARNING_WINDOW_DAYS);
    let home = super::home_zone(&state, req.subject_id)?;

    // Statistics over a month of records: keep it off the async workers
    let learner = state.learner.clone();
    let profile = tokio::task::spawn_blocking(move || {
        learner.learn(req.subject_id, days, home.as_ref())
    })
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))??;

    Ok(Json(LearnResponse { profile }))
}

/// Stored profile for a subject.
pub async fn profile(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
) -> AppResult<Json<HealthProfile>> {
    state
        .learner
        .profile(subject_id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("尚未生成健康画像，请先触发基线学习".to_string()))
}

/// Latest reading measured against the personal baseline, for the
/// "compared to usual" dashboard card.
pub async fn comparison(
    State(state): State<AppState>,
    Path(subject_id): Path<SubjectId>,
) -> AppResult<Json<Value>> {
    let reading = state
        .records
        .latest(subject_id)?
        .ok_or_else(|| AppError::NotFound("暂无健康数据".to_string()))?;

    let current = json!({
        "heart_rate": reading.heart_rate,
        "systolic_bp": reading.systolic_bp,
        "diastolic_bp": reading.diastolic_bp,
        "steps": reading.steps,
    });

    let profile = match state.learner.profile(subject_id)? {
        Some(p) => p,
        None => {
            return Ok(Json(json!({
                "has_profile": false,
                "current": current,
                "baseline": null,
                "comparison": null,
                "message": "尚未建立个人健康画像，建议触发基线学习以获得个性化分析",
            })))
        }
    };

    let cmp = compare(&reading, &profile);

    Ok(Json(json!({
        "has_profile": true,
        "current": current,
        "baseline": {
            "heart_rate_range": format!("{:.0}-{:.0}", profile.learned_hr_low, profile.learned_hr_high),
            "heart_rate_mean": profile.learned_hr_mean,
            "resting_hr": profile.resting_hr,
            "systolic_mean": profile.learned_systolic_mean,
            "diastolic_mean": profile.learned_diastolic_mean,
            "daily_steps_mean": profile.daily_steps_mean,
        },
        "comparison": cmp,
        "profile_summary": {
            "health_summary": profile.health_summary,
            "confidence": profile.confidence_score,
            "data_quality": profile.data_quality,
            "last_updated": profile.learned_at.to_rfc3339(),
        },
    })))
}
