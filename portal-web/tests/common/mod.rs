//! Shared helpers for the HTTP integration tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use portal_core::AuthConfig;
use portal_web::{create_app, AppState, WebConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-signing-key-0123456789";

pub async fn test_app() -> Router {
    let config = WebConfig::new(AuthConfig::new(SECRET, 3600));
    let state = AppState::new(config).await.unwrap();
    create_app(state)
}

pub fn create_request(method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    if let Some(body) = body {
        builder = builder.header("Content-Type", "application/json");
        builder
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    }
}

pub async fn extract_json_response(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Register under `role` ("submitter" or "reviewer") and return the identity id
pub async fn register(app: &Router, role: &str, login: &str, password: &str) -> String {
    let request = create_request(
        "POST",
        &format!("/api/{}/register", role),
        Some(json!({ "login": login, "password": password })),
        None,
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "registering {}", login);
    extract_json_response(response).await["id"]
        .as_str()
        .unwrap()
        .to_string()
}

pub async fn login(app: &Router, role: &str, login: &str, password: &str) -> String {
    let request = create_request(
        "POST",
        &format!("/api/{}/login", role),
        Some(json!({ "login": login, "password": password })),
        None,
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "logging in {}", login);
    extract_json_response(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}
