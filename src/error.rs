use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid token")]
    InvalidToken,

    /// The message is what the caller sees; the cause is only logged.
    #[error("{message}")]
    Internal {
        message: &'static str,
        cause: anyhow::Error,
    },
}

impl AppError {
    pub fn internal(message: &'static str, cause: impl Into<anyhow::Error>) -> Self {
        AppError::Internal {
            message,
            cause: cause.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::InvalidToken => StatusCode::BAD_REQUEST,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal { message, cause } = &self {
            error!("{message}: {cause:#}");
        }

        let status = self.status();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

/// Collapses any lower-level failure into a 500 with a fixed message.
pub trait OrInternal<T> {
    fn or_internal(self, message: &'static str) -> Result<T, AppError>;
}

impl<T> OrInternal<T> for anyhow::Result<T> {
    fn or_internal(self, message: &'static str) -> Result<T, AppError> {
        self.map_err(|cause| AppError::internal(message, cause))
    }
}
