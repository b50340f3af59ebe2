//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// The `Display` text is the client-facing message carried in the response
/// envelope, so variants render their payload verbatim.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid, or expired credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not permitted.
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Conflict (e.g., duplicate email).
    #[error("{0}")]
    Conflict(String),

    /// Too many requests in a window.
    #[error("{0}")]
    RateLimited(String),

    /// Upstream dependency (email, OCR) failed.
    #[error("{0}")]
    ExternalService(String),

    /// Database error. The payload is logged, never shown to clients.
    #[error("Database error: {0}")]
    Database(String),

    /// Unclassified internal error.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::RateLimited(_) => 429,
            Self::ExternalService(_) | Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for logs and API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the message safe to send to a client.
    ///
    /// Database failures are replaced with a generic message; everything else
    /// is surfaced as-is.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Database(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        }
    }
}
