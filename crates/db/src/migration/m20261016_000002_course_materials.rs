//! Course materials table.
//!
//! One row per course; attachments live in a JSON array column.

use sea_orm_migration::prelude::*;

use super::m20261016_000001_courses::Courses;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CourseMaterials::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CourseMaterials::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CourseMaterials::CourseId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(CourseMaterials::Attachments).json().not_null())
                    .col(
                        ColumnDef::new(CourseMaterials::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseMaterials::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_materials_course")
                            .from(CourseMaterials::Table, CourseMaterials::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(CourseMaterials::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum CourseMaterials {
    Table,
    Id,
    CourseId,
    Attachments,
    CreatedAt,
    UpdatedAt,
}
