//! Bearer-token extractors for authenticated routes.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};
use coursekit_core::user::{User, UserService};
use coursekit_db::UserRepository;
use coursekit_shared::AppError;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// User service over the request's database connection.
pub(crate) fn user_service(state: &AppState) -> UserService<UserRepository> {
    UserService::new(
        Arc::new(UserRepository::new((*state.db).clone())),
        state.notifier.clone(),
    )
}

/// The caller, resolved from a valid token over a live session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The account.
    pub user: User,
    /// Session the token is bound to.
    pub session_id: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(|| {
                AppError::Unauthorized("Authorization header with Bearer token is required".into())
            })?;

        let claims = state.jwt.validate(token)?;
        let user = user_service(state)
            .authenticate(claims.sub, claims.sid)
            .await?;

        Ok(Self {
            user,
            session_id: claims.sid,
        })
    }
}

/// An authenticated caller with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let caller = AuthUser::from_request_parts(parts, state).await?;
        if !caller.user.is_admin() {
            return Err(AppError::Forbidden("admin role required".into()).into());
        }
        Ok(Self(caller))
    }
}
