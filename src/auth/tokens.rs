//! Token Issuer
//!
//! Mints and verifies the access/refresh JWT pair. The two token kinds are
//! signed with independent secrets so that compromise of one does not
//! compromise the other.

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{AccessTokenClaims, RefreshTokenClaims, User};

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

/// Issues and verifies both token kinds
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_expiration: i64,
    refresh_expiration: i64,
}

impl TokenIssuer {
    pub fn new(config: &Config) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            access_expiration: config.access_token_expiration,
            refresh_expiration: config.refresh_token_expiration,
        }
    }

    /// Generate a short-lived access token carrying identity claims
    pub fn issue_access_token(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_expiration);

        let claims = AccessTokenClaims {
            sub: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.access_encoding)?;
        Ok(token)
    }

    /// Generate a long-lived refresh token carrying the id claim and a
    /// fresh nonce. The nonce makes every issued token distinct, so a
    /// rotation always supersedes the previous token even when both are
    /// minted within the same second.
    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.refresh_expiration);

        let claims = RefreshTokenClaims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.refresh_encoding)?;
        Ok(token)
    }

    /// Validate an access token, failing on bad signature, malformed
    /// structure or expiry
    pub fn verify_access(&self, token: &str) -> Result<AccessTokenClaims, ApiError> {
        let data = decode::<AccessTokenClaims>(token, &self.access_decoding, &Validation::default())?;
        Ok(data.claims)
    }

    /// Validate a refresh token against the refresh-token secret
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshTokenClaims, ApiError> {
        let data =
            decode::<RefreshTokenClaims>(token, &self.refresh_decoding, &Validation::default())?;
        Ok(data.claims)
    }
}
