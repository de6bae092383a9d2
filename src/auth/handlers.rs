//! Authentication HTTP Handlers
//!
//! Register, login, logout, refresh, change-password and current-user
//! endpoints. Tokens travel in the JSON body and as http-only, secure
//! cookies; the cookie jar is only touched on success.

use crate::auth::cookies::{clear_auth_cookies, incoming_refresh_token, set_auth_cookies};
use crate::auth::extractors::AuthUser;
use crate::error::ApiError;
use crate::models::*;
use crate::AppState;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "User registered successfully",
            "user": user
        })),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.auth.login(req).await?;

    let jar = set_auth_cookies(jar, &response.access_token, &response.refresh_token);

    Ok((jar, Json(response)))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    state.auth.logout(user.id).await?;

    let jar = clear_auth_cookies(jar);

    Ok((jar, Json(serde_json::json!({}))))
}

/// POST /auth/refresh
///
/// Accepts the refresh token from the cookie or, for non-cookie clients,
/// from a `refreshToken` body field.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b);

    let token = incoming_refresh_token(&jar, body.as_ref())
        .ok_or_else(|| ApiError::Auth("Refresh token is required".to_string()))?;

    let response = state.auth.refresh(&token).await?;

    let jar = set_auth_cookies(jar, &response.access_token, &response.refresh_token);

    Ok((jar, Json(response)))
}

/// POST /auth/change-password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.auth.change_password(user.id, req).await?;

    Ok(Json(serde_json::json!({})))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.get_by_id(user.id).await?;

    Ok(Json(UserResponse::from(user)))
}
