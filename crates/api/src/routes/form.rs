//! Multipart attachment forms.
//!
//! Text fields `title` and `description` are read whole; a `file` part is
//! streamed into the staging area chunk by chunk. Unknown fields are skipped.

use axum::extract::{Multipart, multipart::Field};
use tracing::debug;

use crate::error::ApiError;
use coursekit_core::material::AttachmentInput;
use coursekit_core::storage::{StagedUpload, StagingArea};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Read an attachment form, staging its file part if one was sent.
///
/// A `file` part without a filename is treated as absent, which is what
/// browsers send for an empty file input.
pub async fn read_attachment_form(
    mut multipart: Multipart,
    staging: &StagingArea,
) -> Result<AttachmentInput, ApiError> {
    let mut title = None;
    let mut description = None;
    let mut payload: Option<StagedUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("title") => title = Some(field.text().await?),
            Some("description") => description = Some(field.text().await?),
            Some("file") => {
                let Some(filename) = field.file_name().filter(|n| !n.is_empty()) else {
                    debug!("File part without filename ignored");
                    continue;
                };
                if payload.is_some() {
                    return Err(ApiError::bad_upload("only one file may be uploaded"));
                }
                let filename = filename.to_string();
                let content_type = resolve_content_type(field.content_type(), &filename);
                payload = Some(stage_field(field, staging, content_type, filename).await?);
            }
            other => debug!(field = ?other, "Unknown form field skipped"),
        }
    }

    Ok(AttachmentInput::new(title, description, payload))
}

async fn stage_field(
    mut field: Field<'_>,
    staging: &StagingArea,
    content_type: String,
    filename: String,
) -> Result<StagedUpload, ApiError> {
    let mut writer = staging.open().await?;
    while let Some(chunk) = field.chunk().await? {
        writer.write_chunk(&chunk).await?;
    }
    let staged = writer.finish(content_type, filename).await?;

    debug!(
        filename = %staged.filename(),
        content_type = %staged.content_type(),
        size = staged.size(),
        "Upload staged"
    );
    Ok(staged)
}

/// Declared part type, else a guess from the filename.
fn resolve_content_type(declared: Option<&str>, filename: &str) -> String {
    match declared.map(str::trim).filter(|ct| !ct.is_empty()) {
        Some(ct) if ct != FALLBACK_CONTENT_TYPE => ct.to_string(),
        _ => mime_guess::from_path(filename)
            .first()
            .map_or_else(|| FALLBACK_CONTENT_TYPE.to_string(), |m| m.essence_str().to_string()),
    }
}
