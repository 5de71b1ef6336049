/// Unified error types for the Pinory share server
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the server
#[derive(Error, Debug)]
pub enum PinoryError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Authorization errors (not the owner, not a party, blocked)
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors (content, share, or friendship)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict errors (duplicate friend request, already friends)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A friend request addressed to the requester themselves
    #[error("Cannot send a friend request to yourself")]
    SelfRequest,

    /// Slug generation exhausted its retry budget
    #[error("Could not allocate a unique share slug")]
    SlugExhausted,

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert PinoryError to HTTP response
impl IntoResponse for PinoryError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            PinoryError::Authentication(_) => (
                StatusCode::UNAUTHORIZED,
                "AuthenticationRequired",
                self.to_string(),
            ),
            PinoryError::Authorization(_) => {
                (StatusCode::FORBIDDEN, "Forbidden", self.to_string())
            }
            PinoryError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "InvalidRequest", self.to_string())
            }
            PinoryError::SelfRequest => {
                (StatusCode::BAD_REQUEST, "SelfRequest", self.to_string())
            }
            PinoryError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", self.to_string()),
            PinoryError::Conflict(_) => (StatusCode::CONFLICT, "Conflict", self.to_string()),
            // Retryable: a fresh request draws new random slugs
            PinoryError::SlugExhausted => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SlugExhausted",
                self.to_string(),
            ),
            PinoryError::Database(_) | PinoryError::Internal(_) | PinoryError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for server operations
pub type PinoryResult<T> = Result<T, PinoryError>;
