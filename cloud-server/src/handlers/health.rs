//! Health check handler

use axum::Json;
use serde_json::{json, Value};

/// Liveness probe
pub async fn check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "guardian-cloud",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
