//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for courses, course materials and attachments
//! - User accounts with bearer-token authentication
//! - Multipart form staging
//! - JSON error rendering

pub mod auth;
pub mod error;
pub mod routes;

use axum::{Router, extract::DefaultBodyLimit};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use coursekit_core::storage::{StagingArea, StorageService};
use coursekit_core::user::ResetNotifier;
use coursekit_shared::JwtService;

/// Room left in the request body for the text fields and part headers.
const FORM_OVERHEAD: usize = 64 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Object storage for attachment files.
    pub storage: Arc<StorageService>,
    /// Local staging area for inbound uploads.
    pub staging: Arc<StagingArea>,
    /// Access token issuer.
    pub jwt: Arc<JwtService>,
    /// Delivers password reset tokens.
    pub notifier: Arc<dyn ResetNotifier>,
    /// Lifetime of password reset tokens.
    pub reset_token_ttl: chrono::Duration,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.staging.max_file_size())
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_OVERHEAD);

    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
