//! Data Model
//!
//! Typed records for users, tweets, retweets and follows, plus the request
//! and response DTOs and JWT claims. The original dynamic document schema
//! is mapped to explicit records with required/optional fields enumerated.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Usernames are 3-20 chars, alphanumeric or underscore.
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{3,20}$").unwrap());

/// Custom validator for the username pattern
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::new("username")
            .with_message("Username must be 3-20 alphanumeric or underscore characters".into()))
    }
}

// ============================================
// Database Entities
// ============================================

/// User gender enum matching database type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// User entity from database
///
/// `password_hash` and `refresh_token` are never serialized; the stored
/// refresh token is the sole source of truth for refresh validation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar: String,
    pub cover_image: String,
    pub bio: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub location: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tweet entity from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tweet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub image: Option<String>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tweet joined with its author's username
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TweetWithAuthor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_username: String,
    pub content: String,
    pub image: Option<String>,
    pub view_count: i64,
    pub like_count: i64,
    pub retweet_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Retweet entity from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Retweet {
    pub id: Uuid,
    pub tweet_id: Uuid,
    pub user_id: Uuid,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Follow edge from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Follow {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ============================================
// Request DTOs
// ============================================

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, message = "Avatar is required"))]
    pub avatar: String,

    #[serde(default)]
    pub cover_image: Option<String>,
}

/// Login request: either username or email plus password
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Refresh token request (body fallback for non-cookie clients)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Change password request (for authenticated users)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Old password is required"))]
    pub old_password: String,

    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Partial profile update
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: Option<String>,

    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,

    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,

    #[validate(length(max = 100, message = "Location must be at most 100 characters"))]
    pub location: Option<String>,
}

/// New tweet request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTweetRequest {
    #[validate(length(min = 1, max = 280, message = "Tweet must be 1-280 characters"))]
    pub content: String,

    pub image: Option<String>,
}

/// Retweet request with an optional quote
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RetweetRequest {
    #[validate(length(min = 1, max = 100, message = "Quote must be 1-100 characters"))]
    pub content: Option<String>,
}

// ============================================
// Response DTOs
// ============================================

/// Sanitized user record: secret fields stripped before returning to a client
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: String,
    pub bio: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar: user.avatar,
            cover_image: user.cover_image,
            bio: user.bio,
            dob: user.dob,
            gender: user.gender,
            location: user.location,
            created_at: user.created_at,
        }
    }
}

/// Login response: sanitized user plus both tokens
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

/// Token pair returned by the refresh endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Simple message response
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================
// JWT Claims
// ============================================

/// JWT claims for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// User email
    pub email: String,
    /// User name
    pub username: String,
    /// User full name
    pub full_name: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// JWT claims for refresh tokens: id plus a per-issue nonce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Token nonce, unique per issue
    pub jti: Uuid,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}
