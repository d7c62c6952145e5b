//! Storage service implementation using Apache OpenDAL.

use opendal::{Operator, services};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use super::staging::StagedUpload;

/// Reference to an object held by the storage provider.
///
/// Always written as a whole: all four fields come from one transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Permanent URL of the object.
    pub url: String,
    /// Opaque provider identifier, used to delete the object.
    pub object_id: String,
    /// MIME type declared by the uploader.
    pub content_type: String,
    /// Original filename.
    pub filename: String,
}

/// Storage service for course material files.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .endpoint(&StorageProvider::azure_endpoint(account))
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
        }
    }

    /// Validate an upload against config constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if file size or MIME type is invalid.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_file_size,
            ));
        }

        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::invalid_mime_type(content_type));
        }

        Ok(())
    }

    /// Generate the object key for an uploaded material file.
    ///
    /// Format: `materials/{course_id}/{upload_id}/{sanitized_filename}`
    #[must_use]
    pub fn generate_object_key(course_id: Uuid, upload_id: Uuid, filename: &str) -> String {
        format!(
            "materials/{course_id}/{upload_id}/{}",
            sanitize_filename(filename)
        )
    }

    /// Public URL for an object key.
    #[must_use]
    pub fn public_url(&self, object_id: &str) -> String {
        format!("{}/{object_id}", self.config.public_base_url)
    }

    /// Transfer a staged upload to the provider.
    ///
    /// The staged temp file is consumed and removed on every path.
    ///
    /// # Errors
    ///
    /// Returns a rejection error if the payload fails validation, or an
    /// operation error if the provider write fails.
    pub async fn transfer(
        &self,
        course_id: Uuid,
        staged: StagedUpload,
    ) -> Result<StoredFile, StorageError> {
        self.validate_upload(staged.content_type(), staged.size())?;

        let object_id = Self::generate_object_key(course_id, Uuid::new_v4(), staged.filename());
        let bytes = staged.read().await?;

        let mut write = self.operator.write_with(&object_id, bytes);
        // The fs backend has no content-type metadata and rejects the option.
        if self.operator.info().full_capability().write_with_content_type {
            write = write.content_type(staged.content_type());
        }
        write.await?;

        debug!(
            course_id = %course_id,
            object_id = %object_id,
            size = staged.size(),
            provider = self.config.provider.name(),
            "Stored material file"
        );

        Ok(StoredFile {
            url: self.public_url(&object_id),
            object_id,
            content_type: staged.content_type().to_string(),
            filename: staged.filename().to_string(),
        })
    }

    /// Delete an object from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, object_id: &str) -> Result<(), StorageError> {
        self.operator
            .delete(object_id)
            .await
            .map_err(StorageError::from)
    }

    /// Check if an object exists in storage.
    pub async fn exists(&self, object_id: &str) -> bool {
        self.operator.stat(object_id).await.is_ok()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Sanitize filename for storage key.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
/// Names made only of dots would address a parent or current directory, so
/// they become `file` like an empty name.
fn sanitize_filename(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().all(|c| c == '.') {
        "file".to_string()
    } else {
        sanitized
    }
}
