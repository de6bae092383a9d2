//! Credential Store
//!
//! Persistence seam for user credentials and the stored refresh token.
//! The Postgres implementation backs the running service; the session
//! manager's tests drive the same flows against an in-memory store.

use crate::error::ApiError;
use crate::models::User;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Fields persisted for a new account
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub avatar: String,
    pub cover_image: String,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a user by username or email
    async fn find_by_identity(&self, identity: &str) -> Result<Option<User>, ApiError>;

    /// Find a user by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;

    /// Whether a username or email is already taken
    async fn identity_taken(&self, username: &str, email: &str) -> Result<bool, ApiError>;

    /// Insert a new user record and return its id
    async fn insert(&self, new: NewUser) -> Result<Uuid, ApiError>;

    /// Persist (or clear) the current refresh token on a user record
    async fn set_refresh_token(&self, user_id: Uuid, token: Option<&str>) -> Result<(), ApiError>;

    /// Persist a new password hash
    async fn set_password_hash(&self, user_id: Uuid, hash: &str) -> Result<(), ApiError>;
}

/// Postgres-backed credential store (the `users` table)
pub struct PgCredentialStore {
    db: PgPool,
}

impl PgCredentialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_identity(&self, identity: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE username = $1 OR email = $1")
            .bind(identity.to_lowercase())
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn identity_taken(&self, username: &str, email: &str) -> Result<bool, ApiError> {
        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = $1 OR email = $2")
                .bind(username)
                .bind(email)
                .fetch_optional(&self.db)
                .await?;
        Ok(existing.is_some())
    }

    async fn insert(&self, new: NewUser) -> Result<Uuid, ApiError> {
        let inserted: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO users (username, email, full_name, password_hash, avatar, cover_image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.full_name)
        .bind(&new.password_hash)
        .bind(&new.avatar)
        .bind(&new.cover_image)
        .fetch_one(&self.db)
        .await?;
        Ok(inserted.0)
    }

    async fn set_refresh_token(&self, user_id: Uuid, token: Option<&str>) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET refresh_token = $1, updated_at = NOW() WHERE id = $2")
            .bind(token)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn set_password_hash(&self, user_id: Uuid, hash: &str) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(hash)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
