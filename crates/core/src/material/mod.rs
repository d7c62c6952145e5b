//! Course material management.
//!
//! Each course owns at most one material record: an ordered list of
//! attachments, each optionally backed by a file held in object storage.
//! This module provides:
//! - Material record creation and deletion
//! - Attachment upload, listing, lookup, update and deletion
//! - The repository and object-store seams the service runs against

mod error;
mod service;
mod types;

pub use error::MaterialError;
pub use service::{MaterialRepository, MaterialService, ObjectStore};
pub use types::{Attachment, AttachmentInput, CourseMaterial, NewCourseMaterial};
