//! Tweet Service
//!
//! Tweets, retweets and likes.

use crate::error::ApiError;
use crate::models::{CreateTweetRequest, Retweet, RetweetRequest, Tweet, TweetWithAuthor};

use sqlx::PgPool;
use uuid::Uuid;

const TWEET_WITH_AUTHOR: &str = r#"
    SELECT t.id, t.user_id, u.username AS author_username, t.content, t.image,
           t.view_count,
           (SELECT COUNT(*) FROM tweet_likes l WHERE l.tweet_id = t.id) AS like_count,
           (SELECT COUNT(*) FROM retweets r WHERE r.tweet_id = t.id) AS retweet_count,
           t.created_at, t.updated_at
    FROM tweets t
    JOIN users u ON u.id = t.user_id
"#;

pub struct TweetService {
    db: PgPool,
}

impl TweetService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: Uuid, req: CreateTweetRequest) -> Result<Tweet, ApiError> {
        let content = req.content.trim();
        if content.is_empty() {
            return Err(ApiError::Validation("Tweet cannot be empty".to_string()));
        }

        let tweet: Tweet = sqlx::query_as(
            r#"
            INSERT INTO tweets (user_id, content, image)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(content)
        .bind(req.image)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(tweet_id = %tweet.id, user_id = %user_id, "Tweet created");
        Ok(tweet)
    }

    pub async fn get(&self, id: Uuid) -> Result<TweetWithAuthor, ApiError> {
        let sql = format!("{} WHERE t.id = $1", TWEET_WITH_AUTHOR);

        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Tweet not found: {}", id)))
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<TweetWithAuthor>, ApiError> {
        let sql = format!(
            "{} WHERE t.user_id = $1 ORDER BY t.created_at DESC",
            TWEET_WITH_AUTHOR
        );

        let tweets = sqlx::query_as(&sql).bind(user_id).fetch_all(&self.db).await?;
        Ok(tweets)
    }

    /// Delete a tweet; only the author may delete
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
        let tweet: Tweet = sqlx::query_as("SELECT * FROM tweets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Tweet not found: {}", id)))?;

        if tweet.user_id != user_id {
            return Err(ApiError::Auth(
                "Only the author can delete a tweet".to_string(),
            ));
        }

        sqlx::query("DELETE FROM tweets WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    // ============================================
    // Likes
    // ============================================

    pub async fn like(&self, tweet_id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
        self.ensure_exists(tweet_id).await?;

        sqlx::query(
            "INSERT INTO tweet_likes (tweet_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(tweet_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    pub async fn unlike(&self, tweet_id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM tweet_likes WHERE tweet_id = $1 AND user_id = $2")
            .bind(tweet_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    // ============================================
    // Retweets
    // ============================================

    /// Retweet with an optional quote; one retweet per tweet per user
    pub async fn retweet(
        &self,
        tweet_id: Uuid,
        user_id: Uuid,
        req: RetweetRequest,
    ) -> Result<Retweet, ApiError> {
        self.ensure_exists(tweet_id).await?;

        let content = req.content.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());

        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM retweets WHERE tweet_id = $1 AND user_id = $2")
                .bind(tweet_id)
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;

        if existing.is_some() {
            return Err(ApiError::Conflict("Tweet already retweeted".to_string()));
        }

        let retweet: Retweet = sqlx::query_as(
            r#"
            INSERT INTO retweets (tweet_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(tweet_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.db)
        .await?;

        Ok(retweet)
    }

    pub async fn remove_retweet(&self, tweet_id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM retweets WHERE tweet_id = $1 AND user_id = $2")
            .bind(tweet_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Retweet not found".to_string()));
        }

        Ok(())
    }

    async fn ensure_exists(&self, tweet_id: Uuid) -> Result<(), ApiError> {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM tweets WHERE id = $1")
            .bind(tweet_id)
            .fetch_optional(&self.db)
            .await?;

        exists
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound(format!("Tweet not found: {}", tweet_id)))
    }
}
