//! Session Manager
//!
//! Orchestrates login, logout, refresh rotation and password changes,
//! mediating between the credential store and the token issuer. The
//! refresh token stored on the user record is the sole source of truth
//! for refresh validation: a presented token that does not exactly equal
//! the stored value is invalid regardless of whether it is
//! cryptographically well-formed.

use crate::auth::store::{CredentialStore, NewUser, PgCredentialStore};
use crate::auth::tokens::TokenIssuer;
use crate::config::Config;
use crate::error::ApiError;
use crate::models::*;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Hash a password using Argon2id with the configured cost parameters
pub fn hash_password(config: &Config, password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| ApiError::Internal(format!("invalid argon2 params: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(hash)
}

/// One-way comparison of a candidate password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("malformed password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Authentication service
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    config: Config,
    issuer: TokenIssuer,
}

impl AuthService {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self::with_store(Arc::new(PgCredentialStore::new(db)), config)
    }

    /// Build the service on an alternative credential store
    pub fn with_store(store: Arc<dyn CredentialStore>, config: Config) -> Self {
        let issuer = TokenIssuer::new(&config);
        Self {
            store,
            config,
            issuer,
        }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    // ============================================
    // Registration
    // ============================================

    /// Register a new user
    pub async fn register(&self, req: RegisterRequest) -> Result<UserResponse, ApiError> {
        req.validate()?;

        // Required fields must not be blank after trimming.
        if [&req.full_name, &req.password, &req.email, &req.username]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(ApiError::Validation(
                "Please provide all the fields".to_string(),
            ));
        }

        if req.password.len() < self.config.min_password_length {
            return Err(ApiError::Validation(format!(
                "Password must be at least {} characters",
                self.config.min_password_length
            )));
        }

        let username = req.username.to_lowercase();
        let email = req.email.to_lowercase();

        if self.store.identity_taken(&username, &email).await? {
            return Err(ApiError::Conflict(
                "User with email or username already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&self.config, &req.password)?;

        let id = self
            .store
            .insert(NewUser {
                username,
                email,
                full_name: req.full_name,
                password_hash,
                avatar: req.avatar,
                cover_image: req.cover_image.unwrap_or_default(),
            })
            .await?;

        // Post-creation consistency check: the new record must be readable.
        let created = self.store.find_by_id(id).await?.ok_or_else(|| {
            ApiError::Internal("Something went wrong while registering the user".to_string())
        })?;

        tracing::info!(user_id = %created.id, username = %created.username, "User registered");

        Ok(UserResponse::from(created))
    }

    // ============================================
    // Login / Logout
    // ============================================

    /// Authenticate a user by username or email and mint a token pair.
    ///
    /// The new refresh token overwrites any prior value, so a login
    /// invalidates every previously issued refresh token for the account.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, ApiError> {
        req.validate()?;

        let identity = req
            .username
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(req.email.as_deref().filter(|s| !s.trim().is_empty()))
            .ok_or_else(|| {
                ApiError::Validation("Username or email is required".to_string())
            })?;

        let user = self
            .store
            .find_by_identity(identity)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        if !verify_password(&req.password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(ApiError::Auth("Invalid credentials".to_string()));
        }

        let access_token = self.issuer.issue_access_token(&user)?;
        let refresh_token = self.issuer.issue_refresh_token(user.id)?;

        self.store
            .set_refresh_token(user.id, Some(&refresh_token))
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
        })
    }

    /// Clear the stored refresh token for an authenticated user
    pub async fn logout(&self, user_id: Uuid) -> Result<(), ApiError> {
        self.store.set_refresh_token(user_id, None).await?;
        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    // ============================================
    // Token Refresh
    // ============================================

    /// Exchange a refresh token for a new access/refresh pair (rotation).
    ///
    /// The presented token must verify against the refresh secret and
    /// exactly equal the value currently stored on the record; a mismatch
    /// detects reuse of a superseded token.
    pub async fn refresh(&self, presented: &str) -> Result<TokenResponse, ApiError> {
        let claims = self.issuer.verify_refresh(presented)?;

        let user = self
            .store
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| ApiError::Auth("Invalid refresh token".to_string()))?;

        if user.refresh_token.as_deref() != Some(presented) {
            tracing::warn!(user_id = %user.id, "Refresh token reuse or mismatch detected");
            return Err(ApiError::Auth(
                "Refresh token is expired or has been superseded".to_string(),
            ));
        }

        let access_token = self.issuer.issue_access_token(&user)?;
        let refresh_token = self.issuer.issue_refresh_token(user.id)?;

        // Rotation: the old refresh token is now permanently invalid.
        self.store
            .set_refresh_token(user.id, Some(&refresh_token))
            .await?;

        Ok(TokenResponse {
            access_token,
            refresh_token,
        })
    }

    // ============================================
    // Password Change
    // ============================================

    /// Change password for an authenticated user.
    ///
    /// Requires the old password to verify and the new password to meet the
    /// length policy and differ from the old one.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        req.validate()?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        if !verify_password(&req.old_password, &user.password_hash)? {
            return Err(ApiError::Auth("Old password is incorrect".to_string()));
        }

        if req.new_password.len() < self.config.min_password_length {
            return Err(ApiError::Validation(format!(
                "Password must be at least {} characters",
                self.config.min_password_length
            )));
        }

        if req.new_password == req.old_password {
            return Err(ApiError::Validation(
                "New password must differ from the old password".to_string(),
            ));
        }

        let password_hash = hash_password(&self.config, &req.new_password)?;
        self.store.set_password_hash(user.id, &password_hash).await?;

        tracing::info!(user_id = %user.id, "Password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/chirp".to_string(),
            port: 8000,
            access_token_secret: "access-secret-access-secret-access!!".to_string(),
            access_token_expiration: 900,
            refresh_token_secret: "refresh-secret-refresh-secret-refresh".to_string(),
            refresh_token_expiration: 604800,
            // Minimal costs to keep the tests fast.
            argon2_memory_cost: 8,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            min_password_length: 6,
            image_host_upload_url: String::new(),
            image_host_api_key: String::new(),
        }
    }

    #[test]
    fn hash_never_equals_plaintext() {
        let config = test_config();
        let hash = hash_password(&config, "secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn repeated_verification_succeeds() {
        let config = test_config();
        let hash = hash_password(&config, "secret1").unwrap();
        assert!(verify_password("secret1", &hash).unwrap());
        assert!(verify_password("secret1", &hash).unwrap());
    }

    #[test]
    fn wrong_password_fails_verification() {
        let config = test_config();
        let hash = hash_password(&config, "secret1").unwrap();
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        let config = test_config();
        let a = hash_password(&config, "secret1").unwrap();
        let b = hash_password(&config, "secret1").unwrap();
        // Fresh salt each time.
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_internal_error() {
        let err = verify_password("secret1", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    // ============================================
    // Session state machine (in-memory store)
    // ============================================

    #[derive(Default)]
    struct MemoryStore {
        users: Mutex<HashMap<Uuid, User>>,
    }

    #[async_trait]
    impl CredentialStore for MemoryStore {
        async fn find_by_identity(&self, identity: &str) -> Result<Option<User>, ApiError> {
            let identity = identity.to_lowercase();
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| u.username == identity || u.email == identity)
                .cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
            Ok(self.users.lock().unwrap().get(&id).cloned())
        }

        async fn identity_taken(&self, username: &str, email: &str) -> Result<bool, ApiError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .any(|u| u.username == username || u.email == email))
        }

        async fn insert(&self, new: NewUser) -> Result<Uuid, ApiError> {
            let id = Uuid::new_v4();
            let now = Utc::now();
            self.users.lock().unwrap().insert(
                id,
                User {
                    id,
                    username: new.username,
                    email: new.email,
                    full_name: new.full_name,
                    password_hash: new.password_hash,
                    avatar: new.avatar,
                    cover_image: new.cover_image,
                    bio: String::new(),
                    dob: None,
                    gender: None,
                    location: None,
                    refresh_token: None,
                    created_at: now,
                    updated_at: now,
                },
            );
            Ok(id)
        }

        async fn set_refresh_token(
            &self,
            user_id: Uuid,
            token: Option<&str>,
        ) -> Result<(), ApiError> {
            if let Some(user) = self.users.lock().unwrap().get_mut(&user_id) {
                user.refresh_token = token.map(str::to_string);
            }
            Ok(())
        }

        async fn set_password_hash(&self, user_id: Uuid, hash: &str) -> Result<(), ApiError> {
            if let Some(user) = self.users.lock().unwrap().get_mut(&user_id) {
                user.password_hash = hash.to_string();
            }
            Ok(())
        }
    }

    fn test_service() -> AuthService {
        AuthService::with_store(Arc::new(MemoryStore::default()), test_config())
    }

    fn register_req(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            full_name: "Alice".to_string(),
            password: "secret1".to_string(),
            avatar: "https://img.example/a.png".to_string(),
            cover_image: None,
        }
    }

    fn login_req(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: Some(username.to_string()),
            email: None,
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_conflict() {
        let service = test_service();
        service.register(register_req("alice1", "a@x.com")).await.unwrap();

        let err = service
            .register(register_req("alice1", "other@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err = service
            .register(register_req("bob222", "a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_identity() {
        let service = test_service();
        service.register(register_req("alice1", "a@x.com")).await.unwrap();

        let err = service.login(login_req("alice1", "wrong-1")).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));

        let err = service.login(login_req("nobody", "secret1")).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        service.login(login_req("alice1", "secret1")).await.unwrap();
    }

    #[tokio::test]
    async fn refresh_rotates_and_rejects_the_superseded_token() {
        let service = test_service();
        service.register(register_req("alice1", "a@x.com")).await.unwrap();
        let session = service.login(login_req("alice1", "secret1")).await.unwrap();

        let rotated = service.refresh(&session.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, session.refresh_token);

        // The old token is cryptographically valid but no longer stored.
        let err = service.refresh(&session.refresh_token).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));

        // The rotated token is the one the store now recognizes.
        service.refresh(&rotated.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn logout_invalidates_the_stored_refresh_token() {
        let service = test_service();
        service.register(register_req("alice1", "a@x.com")).await.unwrap();
        let session = service.login(login_req("alice1", "secret1")).await.unwrap();

        service.logout(session.user.id).await.unwrap();

        let err = service.refresh(&session.refresh_token).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
    }

    #[tokio::test]
    async fn second_login_supersedes_the_first_session() {
        let service = test_service();
        service.register(register_req("alice1", "a@x.com")).await.unwrap();

        let first = service.login(login_req("alice1", "secret1")).await.unwrap();
        let second = service.login(login_req("alice1", "secret1")).await.unwrap();

        // Single active session: only the latest token refreshes.
        let err = service.refresh(&first.refresh_token).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
        service.refresh(&second.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn change_password_requires_the_old_password() {
        let service = test_service();
        service.register(register_req("alice1", "a@x.com")).await.unwrap();
        let session = service.login(login_req("alice1", "secret1")).await.unwrap();
        let id = session.user.id;

        let err = service
            .change_password(
                id,
                ChangePasswordRequest {
                    old_password: "wrong-1".to_string(),
                    new_password: "secret2".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));

        let err = service
            .change_password(
                id,
                ChangePasswordRequest {
                    old_password: "secret1".to_string(),
                    new_password: "secret1".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        service
            .change_password(
                id,
                ChangePasswordRequest {
                    old_password: "secret1".to_string(),
                    new_password: "secret2".to_string(),
                },
            )
            .await
            .unwrap();

        // The old password no longer logs in; the new one does.
        let err = service.login(login_req("alice1", "secret1")).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
        service.login(login_req("alice1", "secret2")).await.unwrap();
    }
}
