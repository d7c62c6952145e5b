//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration and written with the
//! schema builder so they run on both Postgres and SQLite.

pub use sea_orm_migration::prelude::*;

mod m20261016_000001_courses;
mod m20261016_000002_course_materials;
mod m20261016_000003_users;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261016_000001_courses::Migration),
            Box::new(m20261016_000002_course_materials::Migration),
            Box::new(m20261016_000003_users::Migration),
        ]
    }
}
