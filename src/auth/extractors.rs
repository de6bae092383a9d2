//! Authentication Extractors
//!
//! The authenticated identity is passed as an explicit extractor value into
//! each handler rather than read from ambient request state.

use crate::error::ApiError;
use crate::models::AccessTokenClaims;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Authenticated user information extracted from validated JWT claims
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
}

impl AuthUser {
    pub fn from_claims(claims: &AccessTokenClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email.clone(),
            username: claims.username.clone(),
            full_name: claims.full_name.clone(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Claims are placed in extensions by the require_auth middleware.
        parts
            .extensions
            .get::<AccessTokenClaims>()
            .map(AuthUser::from_claims)
            .ok_or_else(|| ApiError::Auth("Authentication required".to_string()))
    }
}
