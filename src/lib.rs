//! Chirp Backend
//!
//! Backend of a Twitter-like application: user registration and
//! authentication with an access/refresh JWT pair, tweets, retweets,
//! likes, follows, and media upload through a third-party image host.
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables:
//! - `DATABASE_URL` - Postgres connection string (required)
//! - `ACCESS_TOKEN_SECRET` / `ACCESS_TOKEN_EXPIRATION` - access token signing (required / default 900s)
//! - `REFRESH_TOKEN_SECRET` / `REFRESH_TOKEN_EXPIRATION` - refresh token signing (required / default 7d)
//! - `IMAGE_HOST_UPLOAD_URL` / `IMAGE_HOST_API_KEY` - third-party image host
//! - `PORT` - HTTP listen port (default 8000)

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::ApiError;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state: one service per concern, all request-scoped
/// handlers borrow from here.
pub struct AppState {
    pub auth: auth::AuthService,
    pub users: services::UserService,
    pub tweets: services::TweetService,
    pub follows: services::FollowService,
    pub images: services::ImageHost,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            auth: auth::AuthService::new(db.clone(), config.clone()),
            users: services::UserService::new(db.clone()),
            tweets: services::TweetService::new(db.clone()),
            follows: services::FollowService::new(db),
            images: services::ImageHost::new(&config),
        }
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    // Public routes (no authentication required)
    let public = Router::new()
        .route("/auth/register", post(auth::handlers::register))
        .route("/auth/login", post(auth::handlers::login))
        .route("/auth/refresh", post(auth::handlers::refresh))
        .route("/users/:username", get(handlers::users::get_profile))
        .route("/users/:username/tweets", get(handlers::tweets::list_user_tweets))
        .route("/users/:username/followers", get(handlers::follows::followers))
        .route("/users/:username/following", get(handlers::follows::following))
        .route("/tweets/:id", get(handlers::tweets::get_tweet));

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/auth/logout", post(auth::handlers::logout))
        .route("/auth/me", get(auth::handlers::get_current_user))
        .route("/auth/change-password", post(auth::handlers::change_password))
        .route("/users/me", patch(handlers::users::update_profile))
        .route("/users/me/avatar", patch(handlers::users::update_avatar))
        .route("/users/me/cover", patch(handlers::users::update_cover_image))
        .route(
            "/users/:username/follow",
            post(handlers::follows::follow).delete(handlers::follows::unfollow),
        )
        .route("/tweets", post(handlers::tweets::create_tweet))
        .route("/tweets/:id", delete(handlers::tweets::delete_tweet))
        .route(
            "/tweets/:id/like",
            post(handlers::tweets::like_tweet).delete(handlers::tweets::unlike_tweet),
        )
        .route(
            "/tweets/:id/retweet",
            post(handlers::tweets::retweet).delete(handlers::tweets::remove_retweet),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
