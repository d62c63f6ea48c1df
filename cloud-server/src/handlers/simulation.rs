//! Demo simulation handlers
//!
//! Inject an anomalous or normal reading through the regular pipeline, so
//! demos exercise the same code path as device data.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use guardian_core::logic::sim;
use guardian_core::logic::status::build_status;
use guardian_core::SubjectId;

use crate::handlers::records::{assess_reading, BATTERY_PLACEHOLDER};
use crate::{AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SimulationRequest {
    pub subject_id: SubjectId,
}

/// Simulate an emergency: racing heart, elevated BP, outside every zone.
pub async fn inject_anomaly(
    State(state): State<AppState>,
    Json(req): Json<SimulationRequest>,
) -> AppResult<Json<Value>> {
    tracing::info!("Injecting anomaly for subject {}", req.subject_id);

    let reading = sim::anomalous_reading(req.subject_id, Utc::now());
    state.records.insert(&reading)?;

    let assessment = assess_reading(&state, &reading)?;
    let alert = state.alerts.consider(req.subject_id, &assessment)?;
    let status = build_status(&reading, &assessment, BATTERY_PLACEHOLDER, Utc::now());

    Ok(Json(json!({
        "status": "simulation_triggered",
        "data": {
            "heart_rate": reading.heart_rate,
            "systolic_bp": reading.systolic_bp,
            "diastolic_bp": reading.diastolic_bp,
            "steps": reading.steps,
            "latitude": reading.latitude,
            "longitude": reading.longitude,
        },
        "analysis": {
            "risk_assessment": assessment.severity.risk_label(),
            "analysis_report": assessment.message,
            "anomaly_count": assessment.anomaly_count(),
        },
        "alert": alert.map(|a| json!({
            "id": a.id,
            "severity": a.severity,
            "description": a.description,
        })),
        "health_response": status,
    })))
}

/// Back to a calm at-home state.
pub async fn reset(
    State(state): State<AppState>,
    Json(req): Json<SimulationRequest>,
) -> AppResult<Json<Value>> {
    let reading = sim::normal_reading(req.subject_id, Utc::now());
    state.records.insert(&reading)?;

    let assessment = assess_reading(&state, &reading)?;
    let status = build_status(&reading, &assessment, BATTERY_PLACEHOLDER, Utc::now());

    Ok(Json(json!({
        "status": "simulation_reset",
        "health_response": status,
    })))
}
