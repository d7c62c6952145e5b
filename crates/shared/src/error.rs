//! Application-wide error types.

use thiserror::Error;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed or missing.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource already exists and may only be created once.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Uploaded payload was rejected.
    #[error("Bad upload: {0}")]
    BadUpload(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// External service error.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    ///
    /// A duplicate creation is reported as 400, not 409.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) | Self::AlreadyExists(_) | Self::BadUpload(_) => 400,
            Self::Database(_) | Self::ExternalService(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::BadUpload(_) => "BAD_UPLOAD",
            Self::Database(_) => "DATABASE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the message is safe to show to clients.
    ///
    /// Server-side failures carry driver and provider details that stay in logs.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
