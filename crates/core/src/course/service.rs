//! Course service implementation.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::error::CourseError;
use super::types::Course;

/// Maximum title length in characters.
const MAX_TITLE_LEN: usize = 200;

/// Repository trait for course persistence.
pub trait CourseRepository: Send + Sync {
    /// Create a course.
    fn create(
        &self,
        title: String,
    ) -> impl std::future::Future<Output = Result<Course, CourseError>> + Send;

    /// List all courses, newest first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Course>, CourseError>> + Send;

    /// Find a course by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Course>, CourseError>> + Send;

    /// Delete a course by ID. Returns whether a row was removed.
    fn delete(&self, id: Uuid) -> impl std::future::Future<Output = Result<bool, CourseError>> + Send;
}

/// Course service.
pub struct CourseService<R: CourseRepository> {
    repo: Arc<R>,
}

impl<R: CourseRepository> CourseService<R> {
    /// Create a new course service.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Create a course.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank or overlong title, or a repository error.
    pub async fn create_course(&self, title: &str) -> Result<Course, CourseError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CourseError::Validation("title is required".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(CourseError::Validation(format!(
                "title must be at most {MAX_TITLE_LEN} characters"
            )));
        }

        let course = self.repo.create(title.to_string()).await?;
        info!(course_id = %course.id, "Course created");
        Ok(course)
    }

    /// List all courses.
    pub async fn list_courses(&self) -> Result<Vec<Course>, CourseError> {
        self.repo.list().await
    }

    /// Get a course by ID.
    pub async fn get_course(&self, id: Uuid) -> Result<Course, CourseError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(CourseError::NotFound(id))
    }

    /// Delete a course, together with its material record.
    pub async fn delete_course(&self, id: Uuid) -> Result<(), CourseError> {
        if !self.repo.delete(id).await? {
            return Err(CourseError::NotFound(id));
        }
        info!(course_id = %id, "Course deleted");
        Ok(())
    }
}
