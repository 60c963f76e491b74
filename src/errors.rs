use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::analysis::features::MIN_TRADERS_FOR_CLASSIFICATION;

/// Failures of the analysis pipeline itself.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Fewer than [`MIN_TRADERS_FOR_CLASSIFICATION`] traders survived bot
    /// filtering; classification below that is statistically meaningless.
    #[error("insufficient data: {have} non-bot traders, need at least {need}")]
    InsufficientData { have: usize, need: usize },

    /// A refresh is already running. Transient; the caller may retry.
    #[error("analysis is already in progress")]
    AlreadyInProgress,

    /// The data-access or classification collaborator failed.
    #[error("upstream failure: {0}")]
    Upstream(#[source] anyhow::Error),
}

impl AnalysisError {
    pub fn insufficient(have: usize) -> Self {
        AnalysisError::InsufficientData {
            have,
            need: MIN_TRADERS_FOR_CLASSIFICATION,
        }
    }
}

/// HTTP-facing error type for all handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

impl From<AnalysisError> for AppError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::InsufficientData { .. } => AppError::Unprocessable(e.to_string()),
            AnalysisError::AlreadyInProgress => AppError::Unavailable(e.to_string()),
            AnalysisError::Upstream(cause) => AppError::Internal(cause),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}
