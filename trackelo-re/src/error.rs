//! Error types for trackelo-re
//!
//! Module-specific error types using thiserror for clear error
//! propagation. Storage failures roll back the in-flight transaction and
//! propagate unmodified; nothing is partially persisted, so callers may
//! retry safely.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Main error type for the rating engine
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed comparison pair: identical tracks, or a winner outside
    /// the pair. Rejected before any write.
    #[error("Invalid comparison: {0}")]
    InvalidComparison(String),

    /// A session row already exists for this scope; resume it instead
    #[error("Session already exists for scope '{0}'")]
    SessionConflict(String),

    /// Malformed scope string in a request
    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request parameter
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Shared library errors
    #[error(transparent)]
    Common(#[from] trackelo_common::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using trackelo-re Error
pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::InvalidComparison(_) | Error::InvalidScope(_) | Error::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Error::SessionConflict(_) => (StatusCode::CONFLICT, self.to_string()),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Error::Database(_) | Error::Common(_) | Error::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                // Comparison writes are all-or-nothing, so a retry is safe
                format!("{} (nothing was saved, please try again)", self),
            ),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
