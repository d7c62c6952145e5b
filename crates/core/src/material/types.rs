//! Material types and data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::{StagedUpload, StoredFile};

/// One titled, described file entry in a course's material record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Unique identifier, fixed at creation.
    pub id: Uuid,
    /// Title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Stored object, present only when a payload was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<StoredFile>,
}

impl Attachment {
    /// Create an attachment with a fresh identifier.
    #[must_use]
    pub fn new(
        title: Option<String>,
        description: Option<String>,
        file: Option<StoredFile>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            file,
        }
    }
}

/// The per-course aggregate of attachments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseMaterial {
    /// Record identifier.
    pub id: Uuid,
    /// Owning course.
    pub course_id: Uuid,
    /// Attachments in insertion order.
    pub attachments: Vec<Attachment>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl CourseMaterial {
    /// Index of the attachment with the given id.
    #[must_use]
    pub fn position(&self, attachment_id: Uuid) -> Option<usize> {
        self.attachments.iter().position(|a| a.id == attachment_id)
    }

    /// Attachment with the given id.
    #[must_use]
    pub fn attachment(&self, attachment_id: Uuid) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.id == attachment_id)
    }
}

/// Input for creating a material record.
#[derive(Debug, Clone)]
pub struct NewCourseMaterial {
    /// Owning course.
    pub course_id: Uuid,
    /// Initial attachments.
    pub attachments: Vec<Attachment>,
}

/// Fields submitted for creating, adding or updating an attachment.
///
/// Blank strings count as absent.
#[derive(Debug, Default)]
pub struct AttachmentInput {
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Staged payload.
    pub payload: Option<StagedUpload>,
}

impl AttachmentInput {
    /// Build an input, dropping blank title and description.
    #[must_use]
    pub fn new(
        title: Option<String>,
        description: Option<String>,
        payload: Option<StagedUpload>,
    ) -> Self {
        Self {
            title: non_blank(title),
            description: non_blank(description),
            payload,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
