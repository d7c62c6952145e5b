//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File size exceeds maximum allowed.
    #[error("file size {size} bytes exceeds maximum allowed {max} bytes")]
    FileTooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// MIME type not allowed.
    #[error("MIME type '{mime_type}' is not allowed")]
    InvalidMimeType {
        /// The invalid MIME type.
        mime_type: String,
    },

    /// Uploaded file has no content.
    #[error("uploaded file is empty")]
    EmptyUpload,

    /// File not found in storage.
    #[error("file not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Local staging of an upload failed.
    #[error("staging failed: {0}")]
    Staging(#[from] std::io::Error),

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Create a file too large error.
    #[must_use]
    pub fn file_too_large(size: u64, max: u64) -> Self {
        Self::FileTooLarge { size, max }
    }

    /// Create an invalid MIME type error.
    #[must_use]
    pub fn invalid_mime_type(mime_type: impl Into<String>) -> Self {
        Self::InvalidMimeType {
            mime_type: mime_type.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Whether the payload itself was rejected, as opposed to the provider failing.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::FileTooLarge { .. } | Self::InvalidMimeType { .. } | Self::EmptyUpload
        )
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => Self::Operation(err.to_string()),
        }
    }
}
