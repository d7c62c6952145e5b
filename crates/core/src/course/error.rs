//! Course error types.

use thiserror::Error;
use uuid::Uuid;

/// Course operation errors.
#[derive(Debug, Error)]
pub enum CourseError {
    /// Course not found.
    #[error("course not found: {0}")]
    NotFound(Uuid),

    /// Invalid input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl CourseError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}
