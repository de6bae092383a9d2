//! Authentication Middleware
//!
//! Validates the access token from the Authorization header or the
//! `accessToken` cookie and stores the claims in request extensions for the
//! `AuthUser` extractor.

use crate::auth::cookies::ACCESS_TOKEN_COOKIE;
use crate::error::ApiError;
use crate::AppState;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Require an authenticated user
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req)
        .map(str::to_string)
        .or_else(|| jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string()))
        .ok_or_else(|| ApiError::Auth("Authentication required".to_string()))?;

    let claims = state.auth.issuer().verify_access(&token)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
