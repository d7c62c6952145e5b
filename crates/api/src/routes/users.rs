//! User account routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    AppState,
    auth::{AdminUser, AuthUser, user_service},
    error::ApiError,
};
use coursekit_core::user::UserUpdate;
use coursekit_shared::AppError;

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register).get(list_users))
        .route("/users/me", get(me).put(update_me))
        .route("/users/{user_id}", get(get_user).delete(delete_user))
        .route("/users/{user_id}/block", put(block_user))
        .route("/users/{user_id}/unblock", put(unblock_user))
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Login email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Password, at least 8 characters.
    pub password: String,
}

/// Profile update body. Omitted fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// New email.
    pub email: Option<String>,
    /// New display name.
    pub full_name: Option<String>,
}

/// POST `/users`
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user_service(&state)
        .register(&payload.email, &payload.full_name, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET `/users`
async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let users = user_service(&state).list_users().await?;
    Ok(Json(users))
}

/// GET `/users/me`
async fn me(caller: AuthUser) -> impl IntoResponse {
    Json(caller.user)
}

/// PUT `/users/me`
async fn update_me(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = UserUpdate {
        email: payload.email,
        full_name: payload.full_name,
    };
    let user = user_service(&state)
        .update_user(caller.user.id, update)
        .await?;
    Ok(Json(user))
}

/// GET `/users/{user_id}`
///
/// Admins may read any account; everyone else only their own.
async fn get_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if caller.user.id != user_id && !caller.user.is_admin() {
        return Err(AppError::Forbidden("cannot read another user's account".into()).into());
    }
    let user = user_service(&state).get_user(user_id).await?;
    Ok(Json(user))
}

/// DELETE `/users/{user_id}`
async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if admin.user.id == user_id {
        return Err(AppError::Validation("cannot delete your own account".into()).into());
    }
    user_service(&state).delete_user(user_id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

/// PUT `/users/{user_id}/block`
async fn block_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if admin.user.id == user_id {
        return Err(AppError::Validation("cannot block your own account".into()).into());
    }
    let user = user_service(&state).block_user(user_id).await?;
    Ok(Json(user))
}

/// PUT `/users/{user_id}/unblock`
async fn unblock_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user_service(&state).unblock_user(user_id).await?;
    Ok(Json(user))
}
