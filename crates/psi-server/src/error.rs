//! Server error types

use std::time::Duration;

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Structured error response for API clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Missing upload field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid multipart upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Upload not received within {}s", .0.as_secs())]
    UploadTimeout(Duration),

    #[error("Malformed input: {0}")]
    MalformedInput(#[from] psi_core::Error),

    #[error("Metrics recorder not installed")]
    MetricsDisabled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Get the error code for structured responses
    pub fn code(&self) -> &'static str {
        match self {
            ServerError::MissingField(_) => "MISSING_FIELD",
            ServerError::Multipart(_) => "INVALID_MULTIPART",
            ServerError::UploadTimeout(_) => "UPLOAD_TIMEOUT",
            ServerError::MalformedInput(_) => "MALFORMED_INPUT",
            ServerError::MetricsDisabled => "METRICS_DISABLED",
            ServerError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    fn status(&self) -> StatusCode {
        match self {
            ServerError::MissingField(_) => StatusCode::BAD_REQUEST,
            // Carries 413 when the body limit was hit
            ServerError::Multipart(e) => e.status(),
            ServerError::UploadTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            ServerError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ServerError::MetricsDisabled => StatusCode::NOT_FOUND,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let line = match &self {
            ServerError::MalformedInput(e) => e.line(),
            _ => None,
        };
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
            line,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
