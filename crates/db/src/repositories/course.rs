//! Course repository for database operations.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::entities::courses;
use coursekit_core::course::{Course, CourseError, CourseRepository as CourseRepoTrait};

/// Course repository implementation.
#[derive(Debug, Clone)]
pub struct CourseRepository {
    db: DatabaseConnection,
}

impl CourseRepository {
    /// Creates a new course repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl CourseRepoTrait for CourseRepository {
    async fn create(&self, title: String) -> Result<Course, CourseError> {
        let now = Utc::now().into();
        let model = courses::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| CourseError::repository(e.to_string()))?;

        Ok(to_domain(model))
    }

    async fn list(&self) -> Result<Vec<Course>, CourseError> {
        let models = courses::Entity::find()
            .order_by_desc(courses::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| CourseError::repository(e.to_string()))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, CourseError> {
        let model = courses::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CourseError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CourseError> {
        let result = courses::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| CourseError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// Convert database model to domain model.
fn to_domain(model: courses::Model) -> Course {
    Course {
        id: model.id,
        title: model.title,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
