//! Follow Service
//!
//! Follow edges between users and the follower/following lists.

use crate::error::ApiError;
use crate::models::User;

use sqlx::PgPool;
use uuid::Uuid;

pub struct FollowService {
    db: PgPool,
}

impl FollowService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), ApiError> {
        if follower_id == following_id {
            return Err(ApiError::Validation(
                "You cannot follow yourself".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO follows (follower_id, following_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(following_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    pub async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), ApiError> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
                .bind(follower_id)
                .bind(following_id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Follow not found".to_string()));
        }

        Ok(())
    }

    /// Users following the given user
    pub async fn followers(&self, user_id: Uuid) -> Result<Vec<User>, ApiError> {
        let users = sqlx::query_as(
            r#"
            SELECT u.* FROM users u
            JOIN follows f ON f.follower_id = u.id
            WHERE f.following_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }

    /// Users the given user follows
    pub async fn following(&self, user_id: Uuid) -> Result<Vec<User>, ApiError> {
        let users = sqlx::query_as(
            r#"
            SELECT u.* FROM users u
            JOIN follows f ON f.following_id = u.id
            WHERE f.follower_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }
}
