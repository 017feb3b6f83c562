//! Custom error types and handling
//!
//! This module defines the application's error types and implements
//! conversion to HTTP responses for the Axum framework.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::judge::EvaluateError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Language {language} is not supported by problem {problem_id}")]
    UnsupportedLanguage {
        language: String,
        problem_id: String,
    },

    #[error("Submission contains no code")]
    EmptySubmission,

    // Resource errors
    #[error("Not found: {0}")]
    NotFound(String),

    // Infrastructure errors
    #[error("Sandbox unavailable: {0}")]
    SandboxUnavailable(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in response
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

impl AppError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::UnsupportedLanguage { .. } => "UNSUPPORTED_LANGUAGE",
            Self::EmptySubmission => "EMPTY_SUBMISSION",
            Self::NotFound(_) => "NOT_FOUND",
            Self::SandboxUnavailable(_) => "SANDBOX_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::UnsupportedLanguage { .. } | Self::EmptySubmission => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::SandboxUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log infrastructure errors but don't expose details to clients
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::SandboxUnavailable(e) => {
                tracing::error!("Sandbox unavailable: {}", e);
                "Code execution is temporarily unavailable, please retry".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.error_code().to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<EvaluateError> for AppError {
    fn from(err: EvaluateError) -> Self {
        match err {
            EvaluateError::UnsupportedLanguage {
                language,
                problem_id,
            } => AppError::UnsupportedLanguage {
                language,
                problem_id,
            },
            EvaluateError::EmptySubmission => AppError::EmptySubmission,
            EvaluateError::SandboxUnavailable(e) => AppError::SandboxUnavailable(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
