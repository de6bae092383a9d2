//! Tweet Handlers

use crate::auth::extractors::AuthUser;
use crate::error::ApiError;
use crate::models::{CreateTweetRequest, RetweetRequest};
use crate::AppState;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// POST /tweets
pub async fn create_tweet(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateTweetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let tweet = state.tweets.create(user.id, req).await?;

    Ok((StatusCode::CREATED, Json(tweet)))
}

/// GET /tweets/:id
pub async fn get_tweet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tweet = state.tweets.get(id).await?;

    Ok(Json(tweet))
}

/// GET /users/:username/tweets
pub async fn list_user_tweets(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.get_by_username(&username).await?;
    let tweets = state.tweets.list_by_user(user.id).await?;

    Ok(Json(serde_json::json!({
        "data": tweets,
        "count": tweets.len()
    })))
}

/// DELETE /tweets/:id
pub async fn delete_tweet(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.tweets.delete(id, user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /tweets/:id/like
pub async fn like_tweet(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.tweets.like(id, user.id).await?;

    Ok(Json(serde_json::json!({})))
}

/// DELETE /tweets/:id/like
pub async fn unlike_tweet(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.tweets.unlike(id, user.id).await?;

    Ok(Json(serde_json::json!({})))
}

/// POST /tweets/:id/retweet
pub async fn retweet(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    body: Option<Json<RetweetRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    req.validate()?;

    let retweet = state.tweets.retweet(id, user.id, req).await?;

    Ok((StatusCode::CREATED, Json(retweet)))
}

/// DELETE /tweets/:id/retweet
pub async fn remove_retweet(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.tweets.remove_retweet(id, user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
