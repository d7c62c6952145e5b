//! Error rendering for API handlers.
//!
//! Every failure leaves the API as `{"error": <code>, "message": <text>}`.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use coursekit_core::course::CourseError;
use coursekit_core::material::MaterialError;
use coursekit_core::storage::StorageError;
use coursekit_core::user::UserError;
use coursekit_shared::{AppError, JwtError};

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError(AppError);

impl ApiError {
    /// The underlying application error.
    #[must_use]
    pub fn inner(&self) -> &AppError {
        &self.0
    }

    /// Shorthand for a rejected upload.
    pub fn bad_upload(msg: impl Into<String>) -> Self {
        Self(AppError::BadUpload(msg.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if self.0.is_client_error() {
            self.0.to_string()
        } else {
            error!(error = %self.0, "Request failed");
            "An internal error occurred".to_string()
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        if err.is_rejection() {
            Self(AppError::BadUpload(err.to_string()))
        } else {
            Self(AppError::ExternalService(err.to_string()))
        }
    }
}

impl From<MaterialError> for ApiError {
    fn from(err: MaterialError) -> Self {
        match err {
            MaterialError::CourseNotFound(_)
            | MaterialError::MaterialNotFound(_)
            | MaterialError::AttachmentNotFound(_) => Self(AppError::NotFound(err.to_string())),
            MaterialError::AlreadyExists(_) => Self(AppError::AlreadyExists(err.to_string())),
            MaterialError::Storage(e) => e.into(),
            MaterialError::Repository(msg) => Self(AppError::Database(msg)),
        }
    }
}

impl From<CourseError> for ApiError {
    fn from(err: CourseError) -> Self {
        match err {
            CourseError::NotFound(_) => Self(AppError::NotFound(err.to_string())),
            CourseError::Validation(msg) => Self(AppError::Validation(msg)),
            CourseError::Repository(msg) => Self(AppError::Database(msg)),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => Self(AppError::NotFound(err.to_string())),
            UserError::EmailTaken(_) => Self(AppError::AlreadyExists(err.to_string())),
            UserError::InvalidCredentials | UserError::SessionRevoked => {
                Self(AppError::Unauthorized(err.to_string()))
            }
            UserError::Blocked | UserError::NotAdmin => Self(AppError::Forbidden(err.to_string())),
            UserError::InvalidResetToken => Self(AppError::Validation(err.to_string())),
            UserError::Validation(msg) => Self(AppError::Validation(msg)),
            UserError::Password(e) => Self(AppError::Internal(e.to_string())),
            UserError::Repository(msg) => Self(AppError::Database(msg)),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired | JwtError::Invalid(_) => {
                Self(AppError::Unauthorized(err.to_string()))
            }
            JwtError::Encoding(msg) => Self(AppError::Internal(msg)),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        warn!(error = %err, "Malformed multipart body");
        Self(AppError::BadUpload(format!("malformed multipart body: {}", err.body_text())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursekit_core::user::PasswordError;
    use rstest::rstest;
    use uuid::Uuid;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[rstest]
    #[case(MaterialError::CourseNotFound(Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(MaterialError::MaterialNotFound(Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(MaterialError::AttachmentNotFound(Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(MaterialError::AlreadyExists(Uuid::nil()), StatusCode::BAD_REQUEST)]
    #[case(MaterialError::Storage(StorageError::EmptyUpload), StatusCode::BAD_REQUEST)]
    #[case(
        MaterialError::Storage(StorageError::file_too_large(10, 5)),
        StatusCode::BAD_REQUEST
    )]
    #[case(
        MaterialError::Storage(StorageError::operation("connection reset")),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    #[case(MaterialError::repository("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_material_error_status(#[case] err: MaterialError, #[case] expected: StatusCode) {
        assert_eq!(status_of(err), expected);
    }

    #[rstest]
    #[case(CourseError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(CourseError::Validation("blank".into()), StatusCode::BAD_REQUEST)]
    #[case(CourseError::repository("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_course_error_status(#[case] err: CourseError, #[case] expected: StatusCode) {
        assert_eq!(status_of(err), expected);
    }

    #[rstest]
    #[case(UserError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(UserError::EmailTaken("a@b.c".into()), StatusCode::BAD_REQUEST)]
    #[case(UserError::InvalidCredentials, StatusCode::UNAUTHORIZED)]
    #[case(UserError::SessionRevoked, StatusCode::UNAUTHORIZED)]
    #[case(UserError::Blocked, StatusCode::FORBIDDEN)]
    #[case(UserError::NotAdmin, StatusCode::FORBIDDEN)]
    #[case(UserError::InvalidResetToken, StatusCode::BAD_REQUEST)]
    #[case(UserError::Validation("short".into()), StatusCode::BAD_REQUEST)]
    #[case(UserError::Password(PasswordError::Hash("rng".into())), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(UserError::repository("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_user_error_status(#[case] err: UserError, #[case] expected: StatusCode) {
        assert_eq!(status_of(err), expected);
    }

    #[test]
    fn test_internal_failures_use_internal_code() {
        let err: ApiError = UserError::Password(PasswordError::Hash("rng".into())).into();
        assert_eq!(err.inner().error_code(), "INTERNAL_ERROR");

        let err: ApiError = JwtError::Encoding("bad key".into()).into();
        assert_eq!(err.inner().error_code(), "INTERNAL_ERROR");

        let err: ApiError = JwtError::Expired.into();
        assert_eq!(err.inner().error_code(), "UNAUTHORIZED");
    }

    #[test]
    fn test_error_codes() {
        let err: ApiError = MaterialError::AlreadyExists(Uuid::nil()).into();
        assert_eq!(err.inner().error_code(), "ALREADY_EXISTS");

        let err: ApiError = StorageError::invalid_mime_type("application/x-msdownload").into();
        assert_eq!(err.inner().error_code(), "BAD_UPLOAD");
    }
}
