use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rf_core::error::AppError;
use thiserror::Error;

use crate::forms::FormError;

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("bad form: {0}")]
    Form(#[from] FormError),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("template error: {0}")]
    Render(#[from] askama::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::App(AppError::NotFound(..)) => StatusCode::NOT_FOUND,
            ApiError::App(AppError::ValidationFailed(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::App(AppError::PreconditionFailed(_)) | ApiError::Form(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::App(AppError::Unauthorized(_)) => StatusCode::FORBIDDEN,
            ApiError::App(AppError::Storage(_) | AppError::Internal(_))
            | ApiError::Session(_)
            | ApiError::Render(_)
            | ApiError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side details stay in the log.
        let body = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Something went wrong on our side.".to_string()
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
            self.to_string()
        };

        (status, body).into_response()
    }
}
