//! User Profile Handlers
//!
//! Profile reads, partial updates, and avatar/cover image replacement via
//! the third-party image host.

use crate::auth::extractors::AuthUser;
use crate::error::ApiError;
use crate::models::{UpdateProfileRequest, UserResponse};
use crate::AppState;

use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

/// Allowed MIME types for image upload
const ALLOWED_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Max image size: 5MB
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Pull the `image` field out of a multipart body and validate it
async fn read_image_field(
    mut multipart: Multipart,
) -> Result<(String, String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| ApiError::Validation("No filename provided".to_string()))?
            .to_string();

        let content_type = field
            .content_type()
            .ok_or_else(|| ApiError::Validation("No content type provided".to_string()))?
            .to_string();

        if !ALLOWED_TYPES.contains(&content_type.as_str()) {
            return Err(ApiError::Validation(format!(
                "File type '{}' not allowed. Allowed types: {:?}",
                content_type, ALLOWED_TYPES
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(e.to_string()))?
            .to_vec();

        if data.len() > MAX_FILE_SIZE {
            return Err(ApiError::Validation(format!(
                "File too large. Max size: {}MB",
                MAX_FILE_SIZE / 1024 / 1024
            )));
        }

        return Ok((filename, content_type, data));
    }

    Err(ApiError::Validation("No image uploaded".to_string()))
}

/// GET /users/:username
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.get_by_username(&username).await?;

    Ok(Json(UserResponse::from(user)))
}

/// PATCH /users/me
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let updated = state.users.update_profile(user.id, req).await?;

    Ok(Json(UserResponse::from(updated)))
}

/// PATCH /users/me/avatar
pub async fn update_avatar(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (filename, content_type, data) = read_image_field(multipart).await?;

    let url = state.images.upload(&filename, &content_type, data).await?;
    let updated = state.users.set_avatar(user.id, &url).await?;

    tracing::info!(user_id = %user.id, "Avatar updated");

    Ok(Json(UserResponse::from(updated)))
}

/// PATCH /users/me/cover
pub async fn update_cover_image(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (filename, content_type, data) = read_image_field(multipart).await?;

    let url = state.images.upload(&filename, &content_type, data).await?;
    let updated = state.users.set_cover_image(user.id, &url).await?;

    tracing::info!(user_id = %user.id, "Cover image updated");

    Ok(Json(UserResponse::from(updated)))
}
