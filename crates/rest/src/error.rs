//! Error types for the advanced search API.
//!
//! Every error is returned as `{"status": "error", "detail": "..."}` with an
//! HTTP status chosen by where the problem lies:
//!
//! | Storage Error | HTTP Status |
//! |--------------|-------------|
//! | Validation (bad path, operator, aggregation, filter) | 400 |
//! | Search (field resolution, condition validation) | 400 |
//! | Backend (connection, execution) | 500 |
//!
//! An unknown level in the URL is a 404.
//!
//! Bodies that are not JSON objects are rejected with 422 before a request
//! is built. Backend failures never expose their cause to the caller; it is
//! logged instead.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use moltrack_persistence::error::StorageError;
use std::fmt;
use tracing::error;

/// Detail returned for failures the caller cannot act on.
pub const INTERNAL_DETAIL: &str = "An internal error occurred while processing the search";

/// The primary error type for REST API operations.
#[derive(Debug)]
pub enum RestError {
    /// Bad request - validation error (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Unprocessable entity - body could not be read (HTTP 422).
    UnprocessableEntity {
        /// Error message.
        message: String,
    },

    /// Unknown endpoint target (HTTP 404).
    NotFound {
        /// Error message.
        message: String,
    },

    /// Backend is not available (HTTP 503).
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message, logged but not returned.
        message: String,
    },
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::BadRequest { message } => {
                write!(f, "Bad request: {}", message)
            }
            RestError::UnprocessableEntity { message } => {
                write!(f, "Unprocessable entity: {}", message)
            }
            RestError::NotFound { message } => {
                write!(f, "Not found: {}", message)
            }
            RestError::ServiceUnavailable { message } => {
                write!(f, "Service unavailable: {}", message)
            }
            RestError::InternalError { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for RestError {}

impl RestError {
    /// Returns the HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RestError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match self {
            RestError::BadRequest { message }
            | RestError::UnprocessableEntity { message }
            | RestError::NotFound { message }
            | RestError::ServiceUnavailable { message } => message,
            RestError::InternalError { message } => {
                error!(error = %message, "Search failed");
                INTERNAL_DETAIL.to_string()
            }
        };

        (status, Json(error_body(&detail))).into_response()
    }
}

/// Creates the error response body.
fn error_body(detail: &str) -> serde_json::Value {
    serde_json::json!({
        "status": "error",
        "detail": detail,
    })
}

// Implement conversions from storage errors

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Validation(e) => RestError::BadRequest {
                message: e.to_string(),
            },
            StorageError::Search(e) => RestError::BadRequest {
                message: e.to_string(),
            },
            StorageError::Backend(e) => RestError::InternalError {
                message: e.to_string(),
            },
        }
    }
}

/// Result type for REST operations.
pub type RestResult<T> = Result<T, RestError>;
