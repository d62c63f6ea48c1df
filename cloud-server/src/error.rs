//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use guardian_core::{BaselineError, StoreError, ValidationError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Resource errors
    NotFound(String),
    AlreadyExists(String),

    // Validation errors
    ValidationError(String),

    // A learning run is already in flight for the subject
    LearningInProgress(String),

    // Not enough history for the requested learning window
    InsufficientData(String),

    // Database errors
    DatabaseError(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.as_str()),
            AppError::AlreadyExists(msg) => (StatusCode::CONFLICT, msg.as_str()),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::LearningInProgress(msg) => (StatusCode::CONFLICT, msg.as_str()),
            AppError::InsufficientData(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error occurred")
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AppError::AlreadyExists(msg),
            StoreError::Invalid(msg) => AppError::ValidationError(msg),
            other => AppError::DatabaseError(other.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<BaselineError> for AppError {
    fn from(err: BaselineError) -> Self {
        match err {
            BaselineError::InsufficientData { have, need } => AppError::InsufficientData(format!(
                "数据不足，需要至少{}条记录，当前仅有{}条",
                need, have
            )),
            BaselineError::LearningInProgress(subject) => AppError::LearningInProgress(format!(
                "subject {} 的基线学习正在进行中",
                subject
            )),
            BaselineError::Store(e) => AppError::from(e),
            other => AppError::InternalError(other.to_string()),
        }
    }
}
