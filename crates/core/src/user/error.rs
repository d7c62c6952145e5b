//! User error types.

use thiserror::Error;
use uuid::Uuid;

use super::password::PasswordError;

/// User and authentication errors.
#[derive(Debug, Error)]
pub enum UserError {
    /// User not found.
    #[error("user not found: {0}")]
    NotFound(Uuid),

    /// Another account already uses this email.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    /// Unknown email or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Session was logged out, expired, or its user removed.
    #[error("session is no longer valid")]
    SessionRevoked,

    /// Account is blocked.
    #[error("account is blocked")]
    Blocked,

    /// Operation requires the admin role.
    #[error("admin role required")]
    NotAdmin,

    /// Reset token unknown, used, or expired.
    #[error("password reset token is invalid or has expired")]
    InvalidResetToken,

    /// Invalid input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl UserError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}
