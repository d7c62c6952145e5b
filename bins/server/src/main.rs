//! Coursekit API Server
//!
//! Main entry point for the Coursekit backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursekit_api::{AppState, create_router};
use coursekit_core::storage::{StagingArea, StorageConfig, StorageProvider, StorageService};
use coursekit_core::user::{LogResetNotifier, ResetNotifier, UserService};
use coursekit_db::{UserRepository, connect_pool, migrate};
use coursekit_shared::{
    AppConfig, AuthConfig, JwtConfig, JwtService, StorageBackend, StorageSettings,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coursekit=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = connect_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    migrate(&db).await?;
    info!("Connected to database");

    // Create storage service
    let storage = StorageService::from_config(storage_config(&config.storage)?)?;
    info!(
        provider = storage.config().provider.name(),
        public_base_url = %storage.config().public_base_url,
        "Storage service configured"
    );

    let staging = match &config.storage.staging_dir {
        Some(dir) => StagingArea::new(dir, config.storage.max_file_size),
        None => StagingArea::in_temp_dir(config.storage.max_file_size),
    };
    info!(dir = %staging.dir().display(), "Upload staging configured");

    let notifier: Arc<dyn ResetNotifier> = Arc::new(LogResetNotifier);
    bootstrap_admin(&db, &config.auth, notifier.clone()).await?;

    let jwt = JwtService::new(JwtConfig {
        secret: config.auth.jwt_secret.clone(),
        access_token_expires_minutes: config.auth.access_token_expires_minutes,
    });
    if config.auth.jwt_secret == AuthConfig::default().jwt_secret {
        warn!("Using the default JWT secret; set COURSEKIT__AUTH__JWT_SECRET in production");
    }

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        storage: Arc::new(storage),
        staging: Arc::new(staging),
        jwt: Arc::new(jwt),
        notifier,
        reset_token_ttl: chrono::Duration::minutes(config.auth.reset_token_expires_minutes),
    };

    // Create router; the fs backend is served locally under /files
    let mut app = create_router(state);
    if config.storage.backend == StorageBackend::Fs {
        app = app.nest_service("/files", ServeDir::new(&config.storage.root));
    }

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the configured admin account if it does not exist yet.
async fn bootstrap_admin(
    db: &sea_orm::DatabaseConnection,
    auth: &AuthConfig,
    notifier: Arc<dyn ResetNotifier>,
) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&auth.admin_email, &auth.admin_password) else {
        return Ok(());
    };

    let admin = UserService::new(Arc::new(UserRepository::new(db.clone())), notifier)
        .ensure_admin(email, "Administrator", password)
        .await
        .context("Failed to create admin account")?;
    info!(user_id = %admin.id, "Admin account ready");
    Ok(())
}

/// Build the storage service config for the selected backend.
fn storage_config(settings: &StorageSettings) -> anyhow::Result<StorageConfig> {
    let require = |value: &Option<String>, name: &str| {
        value
            .clone()
            .with_context(|| format!("storage.{name} is required for the {:?} backend", settings.backend))
    };

    let provider = match settings.backend {
        StorageBackend::Fs => StorageProvider::local_fs(&settings.root),
        StorageBackend::S3 => StorageProvider::s3(
            require(&settings.endpoint, "endpoint")?,
            require(&settings.bucket, "bucket")?,
            require(&settings.access_key_id, "access_key_id")?,
            require(&settings.secret_access_key, "secret_access_key")?,
            settings.region.clone().unwrap_or_else(|| "auto".to_string()),
        ),
        StorageBackend::Azblob => StorageProvider::azure_blob(
            require(&settings.access_key_id, "access_key_id")?,
            require(&settings.secret_access_key, "secret_access_key")?,
            require(&settings.bucket, "bucket")?,
        ),
    };

    let mut config = StorageConfig::new(provider)
        .with_public_base_url(&settings.public_base_url)
        .with_max_file_size(settings.max_file_size);
    if !settings.allowed_mime_types.is_empty() {
        config = config.with_allowed_mime_types(settings.allowed_mime_types.clone());
    }
    Ok(config)
}
