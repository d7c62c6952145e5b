//! Course material repository for database operations.
//!
//! A material record is one row; its attachments are read and written as a
//! whole JSON array. Saves are last-write-wins.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, Set, SqlErr,
};
use uuid::Uuid;

use crate::entities::{course_materials, courses};
use coursekit_core::material::{
    Attachment, CourseMaterial, MaterialError, MaterialRepository as MaterialRepoTrait,
    NewCourseMaterial,
};

/// Course material repository implementation.
#[derive(Debug, Clone)]
pub struct MaterialRepository {
    db: DatabaseConnection,
}

impl MaterialRepository {
    /// Creates a new material repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl MaterialRepoTrait for MaterialRepository {
    async fn course_exists(&self, course_id: Uuid) -> Result<bool, MaterialError> {
        let count = courses::Entity::find_by_id(course_id)
            .count(&self.db)
            .await
            .map_err(|e| MaterialError::repository(e.to_string()))?;

        Ok(count > 0)
    }

    async fn find_by_course(&self, course_id: Uuid) -> Result<Option<CourseMaterial>, MaterialError> {
        course_materials::Entity::find()
            .filter(course_materials::Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| MaterialError::repository(e.to_string()))?
            .map(to_domain)
            .transpose()
    }

    async fn create(&self, input: NewCourseMaterial) -> Result<CourseMaterial, MaterialError> {
        let now = Utc::now().into();
        let active_model = course_materials::ActiveModel {
            id: Set(Uuid::new_v4()),
            course_id: Set(input.course_id),
            attachments: Set(to_json(&input.attachments)?),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                MaterialError::AlreadyExists(input.course_id)
            } else {
                MaterialError::repository(e.to_string())
            }
        })?;

        to_domain(model)
    }

    async fn save(&self, material: CourseMaterial) -> Result<CourseMaterial, MaterialError> {
        let active_model = course_materials::ActiveModel {
            id: Unchanged(material.id),
            attachments: Set(to_json(&material.attachments)?),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let model = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => MaterialError::MaterialNotFound(material.course_id),
            other => MaterialError::repository(other.to_string()),
        })?;

        to_domain(model)
    }

    async fn delete_by_course(&self, course_id: Uuid) -> Result<bool, MaterialError> {
        let result = course_materials::Entity::delete_many()
            .filter(course_materials::Column::CourseId.eq(course_id))
            .exec(&self.db)
            .await
            .map_err(|e| MaterialError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

fn to_json(attachments: &[Attachment]) -> Result<serde_json::Value, MaterialError> {
    serde_json::to_value(attachments)
        .map_err(|e| MaterialError::repository(format!("failed to encode attachments: {e}")))
}

/// Convert database model to domain model.
fn to_domain(model: course_materials::Model) -> Result<CourseMaterial, MaterialError> {
    let attachments: Vec<Attachment> = serde_json::from_value(model.attachments)
        .map_err(|e| MaterialError::repository(format!("corrupt attachments column: {e}")))?;

    Ok(CourseMaterial {
        id: model.id,
        course_id: model.course_id,
        attachments,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}
