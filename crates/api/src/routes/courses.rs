//! Course routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, auth::AdminUser, error::ApiError};
use coursekit_core::course::CourseService;
use coursekit_db::CourseRepository;

/// Creates the course routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{course_id}", get(get_course).delete(delete_course))
}

/// Request body for creating a course.
#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    /// Course title.
    pub title: String,
}

fn course_service(state: &AppState) -> CourseService<CourseRepository> {
    CourseService::new(Arc::new(CourseRepository::new((*state.db).clone())))
}

/// POST `/courses`
async fn create_course(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let course = course_service(&state).create_course(&payload.title).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// GET `/courses`
async fn list_courses(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let courses = course_service(&state).list_courses().await?;
    Ok(Json(courses))
}

/// GET `/courses/{course_id}`
async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let course = course_service(&state).get_course(course_id).await?;
    Ok(Json(course))
}

/// DELETE `/courses/{course_id}`
///
/// The course's material record goes with it.
async fn delete_course(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    course_service(&state).delete_course(course_id).await?;
    Ok(Json(json!({ "message": "Course deleted successfully" })))
}
