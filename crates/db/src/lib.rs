//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository implementations of the core persistence traits
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{CourseRepository, MaterialRepository, UserRepository};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection with explicit pool bounds.
///
/// An in-memory SQLite database lives in a single connection, so the pool is
/// pinned to one connection for it.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_pool(
    database_url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    if database_url.starts_with("sqlite::memory:") {
        options.max_connections(1).min_connections(1);
    } else {
        options
            .max_connections(max_connections)
            .min_connections(min_connections);
    }

    Database::connect(options).await
}

/// Runs all pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    migration::Migrator::up(db, None).await
}
