//! JWT access tokens.
//!
//! Tokens are bound to a login session; revoking the session invalidates the
//! token before it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token lifetime in minutes.
    pub access_token_expires_minutes: i64,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Login session the token belongs to.
    pub sid: Uuid,
    /// Role at the time of login.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a user session.
    #[must_use]
    pub fn new(user_id: Uuid, session_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: user_id,
            sid: session_id,
            role: role.to_string(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    Encoding(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token is malformed or the signature does not match.
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Issues and validates access tokens.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_expires_minutes", &self.config.access_token_expires_minutes)
            .field("secret", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// When a token issued now would expire.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc::now() + Duration::minutes(self.config.access_token_expires_minutes)
    }

    /// Access token lifetime in seconds.
    #[must_use]
    pub const fn expires_in(&self) -> i64 {
        self.config.access_token_expires_minutes * 60
    }

    /// Issues an access token for a session.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Encoding` if signing fails.
    pub fn issue(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        role: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, session_id, role, expires_at);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Encoding(e.to_string()))
    }

    /// Validates and decodes a token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` for an expired token and
    /// `JwtError::Invalid` for anything else that fails to verify.
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> JwtService {
        JwtService::new(JwtConfig {
            secret: secret.to_string(),
            access_token_expires_minutes: 15,
        })
    }

    #[test]
    fn test_issue_and_validate() {
        let jwt = service("test-secret");
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();

        let token = jwt
            .issue(user_id, session_id, "admin", jwt.expires_at())
            .expect("issue");
        let claims = jwt.validate(&token).expect("validate");

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.sid, session_id);
        assert_eq!(claims.role, "admin");
        assert_eq!(jwt.expires_in(), 900);
    }

    #[test]
    fn test_expired_token() {
        let jwt = service("test-secret");
        let expired = Utc::now() - Duration::hours(1);

        let token = jwt
            .issue(Uuid::new_v4(), Uuid::new_v4(), "user", expired)
            .expect("issue");
        assert!(matches!(jwt.validate(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service("secret-a")
            .issue(Uuid::new_v4(), Uuid::new_v4(), "user", Utc::now() + Duration::hours(1))
            .expect("issue");
        assert!(matches!(
            service("secret-b").validate(&token),
            Err(JwtError::Invalid(_))
        ));
        assert!(service("secret-a").validate("not.a.token").is_err());
    }
}
