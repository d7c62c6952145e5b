//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Object storage and upload staging configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign access tokens.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token lifetime in minutes.
    #[serde(default = "default_access_token_minutes")]
    pub access_token_expires_minutes: i64,
    /// Password reset token lifetime in minutes.
    #[serde(default = "default_reset_token_minutes")]
    pub reset_token_expires_minutes: i64,
    /// Email of the administrator account created at startup, if missing.
    pub admin_email: Option<String>,
    /// Password of that administrator account.
    pub admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_token_expires_minutes: default_access_token_minutes(),
            reset_token_expires_minutes: default_reset_token_minutes(),
            admin_email: None,
            admin_password: None,
        }
    }
}

fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_access_token_minutes() -> i64 {
    60
}

fn default_reset_token_minutes() -> i64 {
    30
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Which object storage backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Local filesystem (development only).
    #[default]
    Fs,
    /// S3-compatible storage.
    S3,
    /// Azure Blob Storage.
    Azblob,
}

/// Object storage and upload staging configuration.
///
/// Backend-specific fields are only read for the selected backend.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Storage backend.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root directory for the `fs` backend.
    #[serde(default = "default_fs_root")]
    pub root: String,
    /// Endpoint URL for the `s3` backend.
    pub endpoint: Option<String>,
    /// Bucket (s3) or container (azblob) name.
    pub bucket: Option<String>,
    /// Region for the `s3` backend.
    pub region: Option<String>,
    /// Access key ID (s3) or account name (azblob).
    pub access_key_id: Option<String>,
    /// Secret access key (s3) or account key (azblob).
    pub secret_access_key: Option<String>,
    /// Base URL under which stored objects are publicly reachable.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Directory where inbound uploads are staged before transfer.
    /// Falls back to the system temp directory.
    pub staging_dir: Option<String>,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Allowed MIME types. Empty means the built-in default list.
    #[serde(default)]
    pub allowed_mime_types: Vec<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: default_fs_root(),
            endpoint: None,
            bucket: None,
            region: None,
            access_key_id: None,
            secret_access_key: None,
            public_base_url: default_public_base_url(),
            staging_dir: None,
            max_file_size: default_max_file_size(),
            allowed_mime_types: Vec::new(),
        }
    }
}

fn default_fs_root() -> String {
    "./storage".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080/files".to_string()
}

fn default_max_file_size() -> u64 {
    20 * 1024 * 1024 // 20MB
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("COURSEKIT").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
