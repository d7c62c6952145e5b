//! User repository: accounts, login sessions and password reset tokens.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::entities::{password_reset_tokens, user_sessions, users};
use coursekit_core::user::{
    NewUser, User, UserError, UserRecord, UserRepository as UserRepoTrait, UserUpdate,
};

/// User repository implementation.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Hashes a reset token for storage.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Generates a random URL-safe token.
    #[must_use]
    pub fn generate_token() -> String {
        let bytes: [u8; 32] = rand::random();
        base64_url::encode(&bytes)
    }

    async fn find_model(&self, id: Uuid) -> Result<Option<users::Model>, UserError> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| UserError::repository(e.to_string()))
    }
}

impl UserRepoTrait for UserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let now = Utc::now().into();
        let model = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(user.email),
            full_name: Set(user.full_name),
            password_hash: Set(user.password_hash),
            role: Set(user.role.as_str().to_string()),
            is_blocked: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| UserError::repository(e.to_string()))?;

        to_domain(model)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError> {
        self.find_model(id).await?.map(to_domain).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, UserError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| UserError::repository(e.to_string()))?;

        model
            .map(|model| {
                let password_hash = model.password_hash.clone();
                to_domain(model).map(|user| UserRecord {
                    user,
                    password_hash,
                })
            })
            .transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserError> {
        users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| UserError::repository(e.to_string()))?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn update(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>, UserError> {
        let Some(model) = self.find_model(id).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = model.into();
        if let Some(email) = update.email {
            active.email = Set(email);
        }
        if let Some(full_name) = update.full_name {
            active.full_name = Set(full_name);
        }
        active.updated_at = Set(Utc::now().into());

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| UserError::repository(e.to_string()))?;
        to_domain(model).map(Some)
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> Result<bool, UserError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| UserError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn set_blocked(&self, id: Uuid, blocked: bool) -> Result<Option<User>, UserError> {
        let Some(model) = self.find_model(id).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = model.into();
        active.is_blocked = Set(blocked);
        active.updated_at = Set(Utc::now().into());

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| UserError::repository(e.to_string()))?;
        to_domain(model).map(Some)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, UserError> {
        let result = users::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| UserError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        expires_at: chrono::DateTime<Utc>,
    ) -> Result<Uuid, UserError> {
        let model = user_sessions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            expires_at: Set(expires_at.into()),
            revoked_at: Set(None),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| UserError::repository(e.to_string()))?;

        Ok(model.id)
    }

    async fn session_active(&self, session_id: Uuid, user_id: Uuid) -> Result<bool, UserError> {
        let session = user_sessions::Entity::find_by_id(session_id)
            .one(&self.db)
            .await
            .map_err(|e| UserError::repository(e.to_string()))?;

        Ok(session.is_some_and(|s| {
            s.user_id == user_id && s.revoked_at.is_none() && s.expires_at > Utc::now()
        }))
    }

    async fn revoke_session(&self, session_id: Uuid) -> Result<(), UserError> {
        user_sessions::Entity::update_many()
            .col_expr(user_sessions::Column::RevokedAt, Expr::value(Utc::now()))
            .filter(user_sessions::Column::Id.eq(session_id))
            .filter(user_sessions::Column::RevokedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| UserError::repository(e.to_string()))?;

        Ok(())
    }

    async fn revoke_user_sessions(&self, user_id: Uuid) -> Result<(), UserError> {
        user_sessions::Entity::update_many()
            .col_expr(user_sessions::Column::RevokedAt, Expr::value(Utc::now()))
            .filter(user_sessions::Column::UserId.eq(user_id))
            .filter(user_sessions::Column::RevokedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| UserError::repository(e.to_string()))?;

        Ok(())
    }

    async fn create_reset_token(
        &self,
        user_id: Uuid,
        expires_at: chrono::DateTime<Utc>,
    ) -> Result<String, UserError> {
        let now = Utc::now();

        password_reset_tokens::Entity::update_many()
            .col_expr(password_reset_tokens::Column::UsedAt, Expr::value(now))
            .filter(password_reset_tokens::Column::UserId.eq(user_id))
            .filter(password_reset_tokens::Column::UsedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| UserError::repository(e.to_string()))?;

        let raw_token = Self::generate_token();
        password_reset_tokens::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            token_hash: Set(Self::hash_token(&raw_token)),
            expires_at: Set(expires_at.into()),
            used_at: Set(None),
            created_at: Set(now.into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| UserError::repository(e.to_string()))?;

        Ok(raw_token)
    }

    async fn consume_reset_token(&self, token: &str) -> Result<Option<Uuid>, UserError> {
        let now = Utc::now();
        let Some(stored) = password_reset_tokens::Entity::find()
            .filter(password_reset_tokens::Column::TokenHash.eq(Self::hash_token(token)))
            .filter(password_reset_tokens::Column::UsedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| UserError::repository(e.to_string()))?
        else {
            return Ok(None);
        };
        if stored.expires_at <= now {
            return Ok(None);
        }

        let user_id = stored.user_id;
        let mut active: password_reset_tokens::ActiveModel = stored.into();
        active.used_at = Set(Some(now.into()));
        active
            .update(&self.db)
            .await
            .map_err(|e| UserError::repository(e.to_string()))?;

        Ok(Some(user_id))
    }
}

/// Convert database model to domain model.
fn to_domain(model: users::Model) -> Result<User, UserError> {
    Ok(User {
        id: model.id,
        role: model.role.parse().map_err(UserError::repository)?,
        email: model.email,
        full_name: model.full_name,
        is_blocked: model.is_blocked,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}
