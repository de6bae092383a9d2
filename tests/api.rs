//! Router-level tests for request validation and the auth boundary.
//!
//! The pool is created lazily and never connected: every request here is
//! rejected before reaching the database.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chirp::{AppState, Config};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/chirp_test".to_string(),
        port: 0,
        access_token_secret: "access-secret-access-secret-access!!".to_string(),
        access_token_expiration: 900,
        refresh_token_secret: "refresh-secret-refresh-secret-refresh".to_string(),
        refresh_token_expiration: 604800,
        argon2_memory_cost: 8,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        min_password_length: 6,
        image_host_upload_url: String::new(),
        image_host_api_key: String::new(),
    }
}

fn test_app() -> Router {
    let config = test_config();
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .expect("lazy pool");
    chirp::router(Arc::new(AppState::new(pool, config)))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn protected_route_requires_auth() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"], "unauthorized");
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/auth/me")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_without_token_is_unauthorized() {
    let response = test_app()
        .oneshot(post_json("/auth/refresh", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"], "unauthorized");
    assert!(response_mentions_refresh(&json));
}

fn response_mentions_refresh(json: &serde_json::Value) -> bool {
    json["message"]
        .as_str()
        .map(|m| m.to_lowercase().contains("refresh"))
        .unwrap_or(false)
}

#[tokio::test]
async fn register_with_invalid_email_is_rejected() {
    let body = r#"{
        "username": "alice1",
        "email": "not-an-email",
        "fullName": "Alice",
        "password": "secret1",
        "avatar": "https://img.example/a.png"
    }"#;

    let response = test_app()
        .oneshot(post_json("/auth/register", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn register_with_bad_username_is_rejected() {
    let body = r#"{
        "username": "a b",
        "email": "a@x.com",
        "fullName": "Alice",
        "password": "secret1",
        "avatar": "https://img.example/a.png"
    }"#;

    let response = test_app()
        .oneshot(post_json("/auth/register", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_without_identifier_is_a_validation_error() {
    let response = test_app()
        .oneshot(post_json("/auth/login", r#"{"password": "secret1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "validation_error");
}
