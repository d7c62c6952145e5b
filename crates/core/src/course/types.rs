//! Course types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    /// Unique identifier.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
