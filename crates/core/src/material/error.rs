//! Material error types.

use thiserror::Error;
use uuid::Uuid;

use crate::storage::StorageError;

/// Material operation errors.
#[derive(Debug, Error)]
pub enum MaterialError {
    /// Course not found.
    #[error("course not found: {0}")]
    CourseNotFound(Uuid),

    /// Course has no material record.
    #[error("no material found for course: {0}")]
    MaterialNotFound(Uuid),

    /// Attachment not found in the course's material record.
    #[error("attachment not found: {0}")]
    AttachmentNotFound(Uuid),

    /// Course already has a material record.
    #[error("course material already exists for course: {0}")]
    AlreadyExists(Uuid),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl MaterialError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Whether this error means something was not found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CourseNotFound(_) | Self::MaterialNotFound(_) | Self::AttachmentNotFound(_)
        )
    }

    /// Whether the uploaded payload was rejected.
    #[must_use]
    pub fn is_bad_upload(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_rejection())
    }
}
