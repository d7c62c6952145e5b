//! API route definitions.

use axum::Router;

use crate::AppState;

mod form;
pub mod auth;
pub mod courses;
pub mod health;
pub mod materials;
pub mod users;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(courses::routes())
        .merge(materials::routes())
        .merge(auth::routes())
        .merge(users::routes())
}
