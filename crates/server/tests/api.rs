//! Router-level tests driven through `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use latchkey_server::config::{ServerConfig, SessionConfig, StoreConfig};
use latchkey_server::db::MemoryUserStore;
use latchkey_server::services::HasherConfig;
use latchkey_server::{AppState, router};

const SECRET: &str = "k9$Qw2!zX7@pL4#rT1^vB8&nM3*cF6%h";

fn app() -> Router {
    let config = ServerConfig {
        store: StoreConfig::Memory,
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        session: SessionConfig {
            jwt_secret: SecretString::from(SECRET),
            ttl: Duration::from_secs(86_400),
            cookie_secure: false,
        },
        hasher: HasherConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        },
        cors_origin: "http://localhost:5173".to_string(),
        sentry_dsn: None,
        sentry_environment: None,
    };

    let state = AppState::new(config, Arc::new(MemoryUserStore::new())).unwrap();
    router(state)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_cookie(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// `token=<value>` pair from the response's `Set-Cookie` header.
fn session_pair(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().trim().to_string()
}

fn alice() -> Value {
    json!({"name": "Alice", "email": "a@x.com", "password": "secret1"})
}

#[tokio::test]
async fn test_register_login_profile_flow() {
    let app = app();

    let response = send(&app, post_json("/api/auth/register", &alice())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Max-Age=86400"));
    assert!(!set_cookie.contains("Secure"));

    let registered = json_body(response).await;
    assert_eq!(registered["name"], "Alice");
    assert_eq!(registered["email"], "a@x.com");
    assert_eq!(registered["phone"], "");
    assert_eq!(registered["address"], "");
    assert!(registered.get("password").is_none());

    let response = send(
        &app,
        post_json(
            "/api/auth/login",
            &json!({"email": "a@x.com", "password": "secret1"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_pair(&response);
    let logged_in = json_body(response).await;
    assert_eq!(logged_in["_id"], registered["_id"]);

    let response = send(&app, get_with_cookie("/api/auth/profile", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile = json_body(response).await;
    assert_eq!(profile["name"], "Alice");
    assert_eq!(profile["_id"], registered["_id"]);
    assert!(profile.get("password").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = app();
    send(&app, post_json("/api/auth/register", &alice())).await;

    let response = send(
        &app,
        post_json(
            "/api/auth/register",
            &json!({"name": "Alicia", "email": "A@X.com", "password": "another1"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(json_body(response).await["message"], "User already exists");
}

#[tokio::test]
async fn test_register_validation_error() {
    let app = app();
    let response = send(
        &app,
        post_json(
            "/api/auth/register",
            &json!({"name": "Alice", "email": "a@x.com", "password": "123"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["message"],
        "Password must be at least 6 characters long"
    );
}

#[tokio::test]
async fn test_login_errors() {
    let app = app();
    send(&app, post_json("/api/auth/register", &alice())).await;

    let response = send(
        &app,
        post_json(
            "/api/auth/login",
            &json!({"email": "a@x.com", "password": "wrong-pass"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(json_body(response).await["message"], "Invalid credentials");

    let response = send(
        &app,
        post_json(
            "/api/auth/login",
            &json!({"email": "nobody@x.com", "password": "secret1"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["message"], "User not found");

    let response = send(&app, post_json("/api/auth/login", &json!({"email": "a@x.com"}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "Password is required");
}

#[tokio::test]
async fn test_profile_without_cookie_is_unauthenticated() {
    let app = app();
    let response = send(&app, get_with_cookie("/api/auth/profile", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["message"], "Not authorized");
}

#[tokio::test]
async fn test_profile_with_tampered_cookie_is_unauthenticated() {
    let app = app();
    let response = send(&app, post_json("/api/auth/register", &alice())).await;
    let cookie = session_pair(&response);

    // Flip the first signature character so the MAC no longer matches
    let sig_start = cookie.rfind('.').unwrap() + 1;
    let mut tampered = cookie.clone();
    let flipped = if cookie[sig_start..].starts_with('A') { "B" } else { "A" };
    tampered.replace_range(sig_start..=sig_start, flipped);

    let response = send(&app, get_with_cookie("/api/auth/profile", Some(&tampered))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        get_with_cookie("/api/auth/profile", Some("token=not-a-jwt")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["message"].is_string());
}

#[tokio::test]
async fn test_health_and_request_id() {
    let app = app();

    let response = send(&app, get_with_cookie("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-request-id").is_some());

    let response = send(&app, get_with_cookie("/health/ready", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}
