//! Login, logout and password reset routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AppState,
    auth::{AuthUser, user_service},
    error::ApiError,
};
use coursekit_core::user::User;

/// Creates the auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/admin/login", post(admin_login))
        .route("/auth/logout", post(logout))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password/{token}", post(reset_password))
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: &'static str,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    /// The logged-in account.
    pub user: User,
}

/// Forgot-password request body.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    /// Account email.
    pub email: String,
}

/// Reset-password request body.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    /// New password.
    pub password: String,
}

async fn open_session(
    state: &AppState,
    payload: &LoginRequest,
    require_admin: bool,
) -> Result<LoginResponse, ApiError> {
    let expires_at = state.jwt.expires_at();
    let session = user_service(state)
        .login(&payload.email, &payload.password, require_admin, expires_at)
        .await?;

    let access_token = state.jwt.issue(
        session.user.id,
        session.session_id,
        session.user.role.as_str(),
        expires_at,
    )?;

    Ok(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt.expires_in(),
        user: session.user,
    })
}

/// POST `/auth/login`
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(open_session(&state, &payload, false).await?))
}

/// POST `/auth/admin/login`
///
/// Same as `/auth/login`, but only admin accounts get in.
async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(open_session(&state, &payload, true).await?))
}

/// POST `/auth/logout`
async fn logout(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    user_service(&state).logout(caller.session_id).await?;
    Ok(Json(json!({ "message": "Logged out successfully" })))
}

/// POST `/auth/forgot-password`
///
/// Answers the same whether or not the email is registered.
async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let expires_at = Utc::now() + state.reset_token_ttl;
    user_service(&state)
        .request_password_reset(&payload.email, expires_at)
        .await?;
    Ok(Json(json!({
        "message": "If the email is registered, a reset link has been sent"
    })))
}

/// POST `/auth/reset-password/{token}`
async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    user_service(&state)
        .reset_password(&token, &payload.password)
        .await?;
    Ok(Json(json!({ "message": "Password reset successfully" })))
}
