//! User types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular account.
    User,
    /// Administrator.
    Admin,
}

impl UserRole {
    /// Stored and token representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A user account, as exposed outside the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Unique identifier.
    pub id: Uuid,
    /// Login email, lowercased.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Role.
    pub role: UserRole,
    /// Blocked accounts cannot log in.
    pub is_blocked: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the account has the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// A user together with the stored password hash.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// The account.
    pub user: User,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login email, lowercased.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Role.
    pub role: UserRole,
}

/// Profile fields a user may change. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New email.
    pub email: Option<String>,
    /// New display name.
    pub full_name: Option<String>,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    /// The logged-in account.
    pub user: User,
    /// Server-side session the access token is bound to.
    pub session_id: Uuid,
}
