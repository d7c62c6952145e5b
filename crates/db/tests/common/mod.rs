//! Shared setup for repository tests.

use sea_orm::DatabaseConnection;

/// Fresh in-memory database with all migrations applied.
pub async fn setup_db() -> DatabaseConnection {
    let db = coursekit_db::connect_pool("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to connect to database");
    coursekit_db::migrate(&db)
        .await
        .expect("Failed to run migrations");
    db
}
