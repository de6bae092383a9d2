//! User Profile Service
//!
//! Profile reads and partial updates. Session state lives in the auth
//! service; this service never touches password or refresh-token fields.

use crate::error::ApiError;
use crate::models::{UpdateProfileRequest, User};

use sqlx::PgPool;
use uuid::Uuid;

pub struct UserService {
    db: PgPool,
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User, ApiError> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User, ApiError> {
        sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username.to_lowercase())
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", username)))
    }

    /// Partial profile update; absent fields keep their current value
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<User, ApiError> {
        let user: User = sqlx::query_as(
            r#"
            UPDATE users SET
                full_name = COALESCE($2, full_name),
                bio = COALESCE($3, bio),
                dob = COALESCE($4, dob),
                gender = COALESCE($5, gender),
                location = COALESCE($6, location),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(req.full_name)
        .bind(req.bio)
        .bind(req.dob)
        .bind(req.gender)
        .bind(req.location)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(user)
    }

    /// Persist a new avatar URI on the caller's record
    pub async fn set_avatar(&self, user_id: Uuid, url: &str) -> Result<User, ApiError> {
        sqlx::query_as(
            "UPDATE users SET avatar = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(url)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Persist a new cover image URI on the caller's record
    pub async fn set_cover_image(&self, user_id: Uuid, url: &str) -> Result<User, ApiError> {
        sqlx::query_as(
            "UPDATE users SET cover_image = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(url)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }
}
