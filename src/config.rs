//! Application Configuration
//!
//! All configuration values are loaded from environment variables.
//! No hardcoded secrets or sensitive data.

use crate::error::ApiError;
use std::env;

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string (from DATABASE_URL env var)
    pub database_url: String,

    /// Port the HTTP server listens on (from PORT env var)
    pub port: u16,

    /// Signing secret for access tokens (from ACCESS_TOKEN_SECRET env var)
    pub access_token_secret: String,

    /// Access token expiration in seconds (from ACCESS_TOKEN_EXPIRATION env var)
    pub access_token_expiration: i64,

    /// Signing secret for refresh tokens (from REFRESH_TOKEN_SECRET env var)
    pub refresh_token_secret: String,

    /// Refresh token expiration in seconds (from REFRESH_TOKEN_EXPIRATION env var)
    pub refresh_token_expiration: i64,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// Minimum password length before hashing (from MIN_PASSWORD_LENGTH env var)
    pub min_password_length: usize,

    /// Third-party image host upload endpoint (from IMAGE_HOST_UPLOAD_URL env var)
    pub image_host_upload_url: String,

    /// Third-party image host API key (from IMAGE_HOST_API_KEY env var)
    pub image_host_api_key: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Panics
    /// Panics if DATABASE_URL, ACCESS_TOKEN_SECRET or REFRESH_TOKEN_SECRET
    /// are not set.
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .expect("DATABASE_URL environment variable must be set"),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),

            access_token_secret: env::var("ACCESS_TOKEN_SECRET")
                .expect("ACCESS_TOKEN_SECRET environment variable must be set"),

            access_token_expiration: env::var("ACCESS_TOKEN_EXPIRATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900), // 15 minutes default

            refresh_token_secret: env::var("REFRESH_TOKEN_SECRET")
                .expect("REFRESH_TOKEN_SECRET environment variable must be set"),

            refresh_token_expiration: env::var("REFRESH_TOKEN_EXPIRATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(604800), // 7 days default

            argon2_memory_cost: env::var("ARGON2_MEMORY_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(65536), // 64 MiB

            argon2_time_cost: env::var("ARGON2_TIME_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),

            argon2_parallelism: env::var("ARGON2_PARALLELISM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),

            min_password_length: env::var("MIN_PASSWORD_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(6),

            image_host_upload_url: env::var("IMAGE_HOST_UPLOAD_URL").unwrap_or_default(),

            image_host_api_key: env::var("IMAGE_HOST_API_KEY").unwrap_or_default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.access_token_secret.len() < 32 {
            return Err(ApiError::Config(
                "ACCESS_TOKEN_SECRET must be at least 32 characters".to_string(),
            ));
        }

        if self.refresh_token_secret.len() < 32 {
            return Err(ApiError::Config(
                "REFRESH_TOKEN_SECRET must be at least 32 characters".to_string(),
            ));
        }

        // Compromise of one secret must not compromise the other.
        if self.access_token_secret == self.refresh_token_secret {
            return Err(ApiError::Config(
                "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ".to_string(),
            ));
        }

        if self.access_token_expiration <= 0 {
            return Err(ApiError::Config(
                "ACCESS_TOKEN_EXPIRATION must be positive".to_string(),
            ));
        }

        if self.refresh_token_expiration <= self.access_token_expiration {
            return Err(ApiError::Config(
                "REFRESH_TOKEN_EXPIRATION must be greater than ACCESS_TOKEN_EXPIRATION"
                    .to_string(),
            ));
        }

        if self.min_password_length < 6 {
            return Err(ApiError::Config(
                "MIN_PASSWORD_LENGTH must be at least 6".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            database_url: "postgres://localhost/chirp".to_string(),
            port: 8000,
            access_token_secret: "a".repeat(32),
            access_token_expiration: 900,
            refresh_token_secret: "b".repeat(32),
            refresh_token_expiration: 604800,
            argon2_memory_cost: 65536,
            argon2_time_cost: 3,
            argon2_parallelism: 4,
            min_password_length: 6,
            image_host_upload_url: String::new(),
            image_host_api_key: String::new(),
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_secret() {
        let mut config = base_config();
        config.access_token_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_shared_secret() {
        let mut config = base_config();
        config.refresh_token_secret = config.access_token_secret.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_inverted_expirations() {
        let mut config = base_config();
        config.refresh_token_expiration = 300;
        assert!(config.validate().is_err());
    }
}
