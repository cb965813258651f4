//! Error types for cytoscan-sa
//!
//! "Analysis completed with zero findings" is never an error; only
//! structurally invalid input and collaborator failures surface here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400) - e.g., no file supplied
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Declared media type is neither video nor image (400)
    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// cytoscan-common error
    #[error("Common error: {0}")]
    Common(#[from] cytoscan_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::UnsupportedMedia(msg) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_MEDIA", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
            ApiError::Other(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
            ApiError::Common(err) => return common_error_response(err),
        };

        error_response(status, error_code, &message)
    }
}

/// Map shared-library errors onto HTTP semantics
fn common_error_response(err: cytoscan_common::Error) -> Response {
    use cytoscan_common::Error;

    let (status, error_code, message) = match err {
        Error::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
        Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
        Error::Storage(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", msg),
        Error::Database(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
            err.to_string(),
        ),
        Error::Io(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "IO_ERROR",
            err.to_string(),
        ),
        Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", msg),
        Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
    };

    error_response(status, error_code, &message)
}

fn error_response(status: StatusCode, error_code: &str, message: &str) -> Response {
    let body = Json(json!({
        "error": {
            "code": error_code,
            "message": message,
        }
    }));

    (status, body).into_response()
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
