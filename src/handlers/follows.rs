//! Follow Handlers

use crate::auth::extractors::AuthUser;
use crate::error::ApiError;
use crate::models::UserResponse;
use crate::AppState;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// POST /users/:username/follow
pub async fn follow(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let target = state.users.get_by_username(&username).await?;
    state.follows.follow(user.id, target.id).await?;

    Ok(Json(serde_json::json!({})))
}

/// DELETE /users/:username/follow
pub async fn unfollow(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let target = state.users.get_by_username(&username).await?;
    state.follows.unfollow(user.id, target.id).await?;

    Ok(Json(serde_json::json!({})))
}

/// GET /users/:username/followers
pub async fn followers(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let target = state.users.get_by_username(&username).await?;
    let users: Vec<UserResponse> = state
        .follows
        .followers(target.id)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(serde_json::json!({
        "data": users,
        "count": users.len()
    })))
}

/// GET /users/:username/following
pub async fn following(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let target = state.users.get_by_username(&username).await?;
    let users: Vec<UserResponse> = state
        .follows
        .following(target.id)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(serde_json::json!({
        "data": users,
        "count": users.len()
    })))
}
