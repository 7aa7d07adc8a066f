/// Error types for Blog Service
///
/// Every failure surfaced by the post and comment services is an `AppError`.
/// Errors are converted to the `{ success: false, message }` envelope with the
/// matching HTTP status.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for blog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing, blank or otherwise invalid input
    #[error("{0}")]
    ValidationError(String),

    /// Malformed request (body, multipart, path)
    #[error("{0}")]
    BadRequest(String),

    /// No authenticated identity
    #[error("{0}")]
    Unauthorized(String),

    /// Requester does not own the resource
    #[error("{0}")]
    Forbidden(String),

    /// Referenced post or comment does not exist
    #[error("{0}")]
    NotFound(String),

    /// Upload above the configured size limit
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Store operation failed
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Media store failed to accept an upload
    #[error("Media error: {0}")]
    MediaError(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message safe to hand to API clients. Server-side failures are not echoed.
    pub fn client_message(&self) -> String {
        match self {
            AppError::DatabaseError(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
            AppError::MediaError(_) => "Failed to store uploaded media".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::MediaError(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        }

        HttpResponse::build(status).json(serde_json::json!({
            "success": false,
            "message": self.client_message(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(errors.to_string())
    }
}
