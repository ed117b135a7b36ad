use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::upload::validator::MAX_UPLOAD_BYTES;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Upstream detail is decided when the error is built (see `Config::error_detail`),
/// so rendering never needs to know the environment.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid file type. Only PDF, DOC, and DOCX files are allowed.")]
    InvalidFileType,

    #[error("File too large. Maximum size is {}MB.", MAX_UPLOAD_BYTES / (1024 * 1024))]
    FileTooLarge,

    #[error("No file uploaded")]
    MissingFile,

    #[error("{message}")]
    InvalidRequest {
        message: String,
        detail: Option<String>,
    },

    #[error("Failed to parse resume. Please try again.")]
    UpstreamParseFailure { detail: Option<String> },

    #[error("Failed to generate recommendations. Please try again.")]
    RecommendationFailure { detail: Option<String> },

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        AppError::InvalidRequest {
            message: message.into(),
            detail: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidFileType
            | AppError::FileTooLarge
            | AppError::MissingFile
            | AppError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UpstreamParseFailure { .. }
            | AppError::RecommendationFailure { .. }
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body shared by every failed response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, error) = match self {
            AppError::InvalidRequest { message, detail } => (message, detail),
            AppError::UpstreamParseFailure { ref detail }
            | AppError::RecommendationFailure { ref detail } => {
                tracing::error!("Upstream relay failed: {self} ({detail:?})");
                (self.to_string(), detail.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                ("Internal server error".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let body = Json(ErrorBody {
            success: false,
            message,
            error,
        });

        (status, body).into_response()
    }
}
