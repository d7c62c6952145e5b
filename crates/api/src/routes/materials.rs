//! Course material and attachment routes.
//!
//! Multipart handlers check the course and material first, and only then
//! stage the request body. Staged files are removed once the handler
//! returns, whatever the outcome.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use uuid::Uuid;

use super::form::read_attachment_form;
use crate::{AppState, error::ApiError};
use coursekit_core::material::MaterialService;
use coursekit_core::storage::StorageService;
use coursekit_db::MaterialRepository;

type Service = MaterialService<MaterialRepository, StorageService>;

/// Creates the material routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/courses/{course_id}/materials",
            post(create_material).delete(delete_material),
        )
        .route(
            "/courses/{course_id}/materials/attachments",
            post(upload_attachment).get(list_attachments),
        )
        .route(
            "/courses/{course_id}/materials/attachments/{attachment_id}",
            get(get_attachment)
                .put(update_attachment)
                .delete(delete_attachment),
        )
}

fn material_service(state: &AppState) -> Service {
    let repo = MaterialRepository::new((*state.db).clone());
    MaterialService::new(Arc::new(repo), state.storage.clone())
}

/// POST `/courses/{course_id}/materials`
async fn create_material(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let service = material_service(&state);
    service.ensure_creatable(course_id).await?;

    let input = read_attachment_form(multipart, &state.staging).await?;
    let material = service.create_material(course_id, input).await?;

    Ok((StatusCode::CREATED, Json(material)))
}

/// DELETE `/courses/{course_id}/materials`
async fn delete_material(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    material_service(&state).delete_material(course_id).await?;
    Ok(Json(json!({ "message": "Course material deleted successfully" })))
}

/// POST `/courses/{course_id}/materials/attachments`
async fn upload_attachment(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let service = material_service(&state);
    service.ensure_exists(course_id, None).await?;

    let input = read_attachment_form(multipart, &state.staging).await?;
    let attachment = service.upload_attachment(course_id, input).await?;

    Ok((StatusCode::CREATED, Json(attachment)))
}

/// GET `/courses/{course_id}/materials/attachments`
async fn list_attachments(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let attachments = material_service(&state).list_attachments(course_id).await?;
    Ok(Json(attachments))
}

/// GET `/courses/{course_id}/materials/attachments/{attachment_id}`
async fn get_attachment(
    State(state): State<AppState>,
    Path((course_id, attachment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let attachment = material_service(&state)
        .get_attachment(course_id, attachment_id)
        .await?;
    Ok(Json(attachment))
}

/// PUT `/courses/{course_id}/materials/attachments/{attachment_id}`
async fn update_attachment(
    State(state): State<AppState>,
    Path((course_id, attachment_id)): Path<(Uuid, Uuid)>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let service = material_service(&state);
    service.ensure_exists(course_id, Some(attachment_id)).await?;

    let input = read_attachment_form(multipart, &state.staging).await?;
    let attachment = service
        .update_attachment(course_id, attachment_id, input)
        .await?;

    Ok(Json(attachment))
}

/// DELETE `/courses/{course_id}/materials/attachments/{attachment_id}`
async fn delete_attachment(
    State(state): State<AppState>,
    Path((course_id, attachment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    material_service(&state)
        .delete_attachment(course_id, attachment_id)
        .await?;
    Ok(Json(json!({ "message": "Attachment deleted successfully" })))
}
