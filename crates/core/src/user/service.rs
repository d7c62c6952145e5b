//! User service implementation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::error::UserError;
use super::notifier::ResetNotifier;
use super::password::{hash_password, verify_password};
use super::types::{LoginSession, NewUser, User, UserRecord, UserRole, UserUpdate};

/// Minimum password length in characters.
const MIN_PASSWORD_LEN: usize = 8;

/// Maximum display name length in characters.
const MAX_NAME_LEN: usize = 100;

/// Repository trait for accounts, sessions and reset tokens.
pub trait UserRepository: Send + Sync {
    /// Create an account.
    fn create(
        &self,
        user: NewUser,
    ) -> impl std::future::Future<Output = Result<User, UserError>> + Send;

    /// Find an account by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<User>, UserError>> + Send;

    /// Find an account and its password hash by email.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserRecord>, UserError>> + Send;

    /// List all accounts, oldest first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<User>, UserError>> + Send;

    /// Apply a profile update. Returns `None` if the account does not exist.
    fn update(
        &self,
        id: Uuid,
        update: UserUpdate,
    ) -> impl std::future::Future<Output = Result<Option<User>, UserError>> + Send;

    /// Replace the password hash. Returns whether the account exists.
    fn set_password(
        &self,
        id: Uuid,
        password_hash: String,
    ) -> impl std::future::Future<Output = Result<bool, UserError>> + Send;

    /// Set the blocked flag. Returns `None` if the account does not exist.
    fn set_blocked(
        &self,
        id: Uuid,
        blocked: bool,
    ) -> impl std::future::Future<Output = Result<Option<User>, UserError>> + Send;

    /// Delete an account with its sessions and reset tokens.
    fn delete(&self, id: Uuid) -> impl std::future::Future<Output = Result<bool, UserError>> + Send;

    /// Open a session expiring at `expires_at`.
    fn create_session(
        &self,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Uuid, UserError>> + Send;

    /// Whether the session belongs to the user, is not revoked and has not expired.
    fn session_active(
        &self,
        session_id: Uuid,
        user_id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, UserError>> + Send;

    /// Revoke one session.
    fn revoke_session(
        &self,
        session_id: Uuid,
    ) -> impl std::future::Future<Output = Result<(), UserError>> + Send;

    /// Revoke every session of a user.
    fn revoke_user_sessions(
        &self,
        user_id: Uuid,
    ) -> impl std::future::Future<Output = Result<(), UserError>> + Send;

    /// Issue a reset token, invalidating earlier ones. Returns the raw token;
    /// only its hash is stored.
    fn create_reset_token(
        &self,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<String, UserError>> + Send;

    /// Mark a token used and return its user, if it is unused and unexpired.
    fn consume_reset_token(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Option<Uuid>, UserError>> + Send;
}

/// User service.
pub struct UserService<R: UserRepository> {
    repo: Arc<R>,
    notifier: Arc<dyn ResetNotifier>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new user service.
    #[must_use]
    pub fn new(repo: Arc<R>, notifier: Arc<dyn ResetNotifier>) -> Self {
        Self { repo, notifier }
    }

    /// Register a regular account.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad input and `EmailTaken` if the email is in use.
    pub async fn register(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> Result<User, UserError> {
        self.create_account(email, full_name, password, UserRole::User)
            .await
    }

    /// Create the admin account unless the email is already registered.
    pub async fn ensure_admin(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> Result<User, UserError> {
        let email = normalize_email(email)?;
        if let Some(existing) = self.repo.find_by_email(&email).await? {
            if !existing.user.is_admin() {
                warn!(email = %email, "Configured admin email belongs to a non-admin account");
            }
            return Ok(existing.user);
        }
        self.create_account(&email, full_name, password, UserRole::Admin)
            .await
    }

    async fn create_account(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, UserError> {
        let email = normalize_email(email)?;
        let full_name = validate_name(full_name)?;
        validate_password(password)?;

        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(UserError::EmailTaken(email));
        }

        let user = self
            .repo
            .create(NewUser {
                email,
                full_name,
                password_hash: hash_password(password)?,
                role,
            })
            .await?;
        info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Check credentials and open a session.
    ///
    /// With `require_admin`, a valid non-admin login is rejected with `NotAdmin`.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        require_admin: bool,
        expires_at: DateTime<Utc>,
    ) -> Result<LoginSession, UserError> {
        let email = email.trim().to_lowercase();
        let Some(record) = self.repo.find_by_email(&email).await? else {
            return Err(UserError::InvalidCredentials);
        };
        if !verify_password(password, &record.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        let user = record.user;
        if user.is_blocked {
            return Err(UserError::Blocked);
        }
        if require_admin && !user.is_admin() {
            return Err(UserError::NotAdmin);
        }

        let session_id = self.repo.create_session(user.id, expires_at).await?;
        info!(user_id = %user.id, session_id = %session_id, "User logged in");
        Ok(LoginSession { user, session_id })
    }

    /// Revoke a session.
    pub async fn logout(&self, session_id: Uuid) -> Result<(), UserError> {
        self.repo.revoke_session(session_id).await?;
        info!(session_id = %session_id, "User logged out");
        Ok(())
    }

    /// Resolve the account behind an access token's session.
    pub async fn authenticate(&self, user_id: Uuid, session_id: Uuid) -> Result<User, UserError> {
        if !self.repo.session_active(session_id, user_id).await? {
            return Err(UserError::SessionRevoked);
        }
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::SessionRevoked)?;
        if user.is_blocked {
            return Err(UserError::Blocked);
        }
        Ok(user)
    }

    /// Get an account by ID.
    pub async fn get_user(&self, id: Uuid) -> Result<User, UserError> {
        self.repo.find_by_id(id).await?.ok_or(UserError::NotFound(id))
    }

    /// List all accounts.
    pub async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repo.list().await
    }

    /// Update profile fields.
    pub async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<User, UserError> {
        let email = update.email.as_deref().map(normalize_email).transpose()?;
        let full_name = update.full_name.as_deref().map(validate_name).transpose()?;

        if let Some(email) = &email {
            if let Some(other) = self.repo.find_by_email(email).await? {
                if other.user.id != id {
                    return Err(UserError::EmailTaken(email.clone()));
                }
            }
        }

        let user = self
            .repo
            .update(id, UserUpdate { email, full_name })
            .await?
            .ok_or(UserError::NotFound(id))?;
        info!(user_id = %id, "User updated");
        Ok(user)
    }

    /// Delete an account.
    pub async fn delete_user(&self, id: Uuid) -> Result<(), UserError> {
        if !self.repo.delete(id).await? {
            return Err(UserError::NotFound(id));
        }
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Block an account and end its sessions.
    pub async fn block_user(&self, id: Uuid) -> Result<User, UserError> {
        let user = self
            .repo
            .set_blocked(id, true)
            .await?
            .ok_or(UserError::NotFound(id))?;
        self.repo.revoke_user_sessions(id).await?;
        info!(user_id = %id, "User blocked");
        Ok(user)
    }

    /// Unblock an account.
    pub async fn unblock_user(&self, id: Uuid) -> Result<User, UserError> {
        let user = self
            .repo
            .set_blocked(id, false)
            .await?
            .ok_or(UserError::NotFound(id))?;
        info!(user_id = %id, "User unblocked");
        Ok(user)
    }

    /// Issue a reset token and hand it to the notifier.
    ///
    /// Unknown emails succeed silently so callers cannot probe for accounts.
    pub async fn request_password_reset(
        &self,
        email: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), UserError> {
        let email = email.trim().to_lowercase();
        let Some(record) = self.repo.find_by_email(&email).await? else {
            info!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = self
            .repo
            .create_reset_token(record.user.id, expires_at)
            .await?;
        self.notifier.send_reset(&record.user.email, &token);
        Ok(())
    }

    /// Set a new password using a reset token. Ends all existing sessions.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), UserError> {
        validate_password(new_password)?;

        let user_id = self
            .repo
            .consume_reset_token(token)
            .await?
            .ok_or(UserError::InvalidResetToken)?;
        if !self
            .repo
            .set_password(user_id, hash_password(new_password)?)
            .await?
        {
            return Err(UserError::InvalidResetToken);
        }
        self.repo.revoke_user_sessions(user_id).await?;
        info!(user_id = %user_id, "Password reset");
        Ok(())
    }
}

fn normalize_email(email: &str) -> Result<String, UserError> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(UserError::Validation("a valid email is required".to_string()));
    }
    Ok(email)
}

fn validate_name(name: &str) -> Result<String, UserError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(UserError::Validation("full name is required".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(UserError::Validation(format!(
            "full name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_password(password: &str) -> Result<(), UserError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(UserError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
