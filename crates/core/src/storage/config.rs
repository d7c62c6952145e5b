//! Storage configuration types.

use std::path::PathBuf;

/// Object storage backend and its credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageProvider {
    /// S3-compatible bucket: AWS S3, Cloudflare R2, MinIO.
    S3 {
        /// Service endpoint URL.
        endpoint: String,
        /// Bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region; `auto` for R2.
        region: String,
    },
    /// Azure Blob Storage container.
    AzureBlob {
        /// Storage account name.
        account: String,
        /// Storage account key.
        access_key: String,
        /// Container name.
        container: String,
    },
    /// Directory on the local filesystem. Development and tests only.
    LocalFs {
        /// Root directory objects are written under.
        root: PathBuf,
    },
}

impl StorageProvider {
    /// S3-compatible provider.
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Azure Blob provider.
    #[must_use]
    pub fn azure_blob(
        account: impl Into<String>,
        access_key: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self::AzureBlob {
            account: account.into(),
            access_key: access_key.into(),
            container: container.into(),
        }
    }

    /// Local filesystem provider rooted at `root`.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Short provider name, used in logs and the health check.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
        }
    }

    /// Blob service endpoint of an Azure storage account.
    #[must_use]
    pub fn azure_endpoint(account: &str) -> String {
        format!("https://{account}.blob.core.windows.net")
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Base URL that stored objects are served from. The object key is appended.
    pub public_base_url: String,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
    /// Allowed MIME types for upload.
    pub allowed_mime_types: Vec<String>,
}

impl StorageConfig {
    /// Default max file size: 20MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;
    /// Default public base URL, matching the server's default bind address.
    pub const DEFAULT_PUBLIC_BASE_URL: &'static str = "http://localhost:8080/files";

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            public_base_url: Self::DEFAULT_PUBLIC_BASE_URL.to_string(),
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: Self::default_mime_types(),
        }
    }

    /// Set the public base URL. A trailing slash is dropped.
    #[must_use]
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.public_base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set allowed MIME types.
    #[must_use]
    pub fn with_allowed_mime_types(mut self, types: Vec<String>) -> Self {
        self.allowed_mime_types = types;
        self
    }

    /// Default allowed MIME types for course material.
    #[must_use]
    pub fn default_mime_types() -> Vec<String> {
        [
            // Documents
            "application/pdf",
            "application/msword",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "application/vnd.ms-excel",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "application/vnd.ms-powerpoint",
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            "text/plain",
            "text/markdown",
            "application/zip",
            // Images
            "image/png",
            "image/jpeg",
            "image/gif",
            "image/webp",
            // Media
            "audio/mpeg",
            "video/mp4",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    /// Check if a MIME type is allowed.
    ///
    /// Parameters such as `; charset=utf-8` are ignored.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        let essence = mime_type.split(';').next().unwrap_or_default().trim();
        self.allowed_mime_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(essence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_provider_names() {
        let s3 = StorageProvider::s3(
            "https://account.r2.cloudflarestorage.com",
            "materials",
            "access_key",
            "secret_key",
            "auto",
        );
        assert_eq!(s3.name(), "s3");
        assert_eq!(
            StorageProvider::azure_blob("coursekit", "key", "materials").name(),
            "azure_blob"
        );
        assert_eq!(StorageProvider::local_fs("./storage").name(), "local");
    }

    #[test]
    fn test_azure_endpoint() {
        assert_eq!(
            StorageProvider::azure_endpoint("coursekit"),
            "https://coursekit.blob.core.windows.net"
        );
    }

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::new(StorageProvider::local_fs("./storage"));
        assert_eq!(config.max_file_size, StorageConfig::DEFAULT_MAX_FILE_SIZE);
        assert_eq!(
            config.public_base_url,
            StorageConfig::DEFAULT_PUBLIC_BASE_URL
        );
        assert!(!config.allowed_mime_types.is_empty());
    }

    #[test]
    fn test_public_base_url_trailing_slash() {
        let config = StorageConfig::new(StorageProvider::local_fs("./storage"))
            .with_public_base_url("https://cdn.example.com/files/");
        assert_eq!(config.public_base_url, "https://cdn.example.com/files");
    }

    #[test]
    fn test_mime_type_validation() {
        let config = StorageConfig::new(StorageProvider::local_fs("./storage"));
        assert!(config.is_mime_type_allowed("application/pdf"));
        assert!(config.is_mime_type_allowed("image/PNG"));
        assert!(config.is_mime_type_allowed("text/plain; charset=utf-8"));
        assert!(!config.is_mime_type_allowed("application/x-executable"));
        assert!(!config.is_mime_type_allowed("text/html"));
    }
}
