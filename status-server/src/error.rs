//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};

use atm_health_core::logic::remote::ErrorResponse;
use atm_health_core::ModelError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed body or record
    #[error("{0}")]
    Validation(String),

    /// Record fields differ from the classifier's feature layout
    #[error("{0}")]
    SchemaMismatch(String),

    #[error("{0}")]
    Model(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::SchemaMismatch(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Model(msg) => {
                tracing::error!("Classification failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Classification failed".to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            status: status.as_u16(),
        });

        (status, body).into_response()
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::SchemaMismatch(e) => AppError::SchemaMismatch(format!("schema mismatch: {}", e)),
            other => AppError::Model(other.to_string()),
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
