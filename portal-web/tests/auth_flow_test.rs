//! Registration, login and access-gate behavior over HTTP

mod common;

use axum::http::{
    header::{CONTENT_TYPE, WWW_AUTHENTICATE},
    StatusCode,
};
use common::*;
use portal_applications::TokenCodec;
use portal_core::Role;
use serde_json::json;
use std::time::Duration;
use tower::ServiceExt;

#[tokio::test]
async fn test_register_login_and_me() {
    let app = test_app().await;

    let id = register(&app, "submitter", "alice", "pw1").await;
    let token = login(&app, "submitter", "alice", "pw1").await;

    let response = app
        .clone()
        .oneshot(create_request("GET", "/api/auth/me", None, Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let me = extract_json_response(response).await;
    assert_eq!(me["id"], id);
    assert_eq!(me["login"], "alice");
    assert_eq!(me["role"], "SUBMITTER");
}

#[tokio::test]
async fn test_login_response_shape() {
    let app = test_app().await;
    register(&app, "reviewer", "bob", "pw2").await;

    let response = app
        .clone()
        .oneshot(create_request(
            "POST",
            "/api/reviewer/login",
            Some(json!({ "username": "bob", "password": "pw2" })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json_response(response).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    assert!(body["access_token"].as_str().unwrap().split('.').count() == 3);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = test_app().await;
    register(&app, "submitter", "alice", "pw1").await;

    // Same login under the other role is still taken
    let response = app
        .clone()
        .oneshot(create_request(
            "POST",
            "/api/reviewer/register",
            Some(json!({ "login": "alice", "password": "other" })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(extract_json_response(response).await["error"], "identity_exists");
}

#[tokio::test]
async fn test_empty_fields_are_rejected() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(create_request(
            "POST",
            "/api/submitter/register",
            Some(json!({ "login": "  ", "password": "pw" })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_login_and_wrong_password_look_alike() {
    let app = test_app().await;
    register(&app, "submitter", "alice", "pw1").await;

    let mut bodies = Vec::new();
    for (login, password) in [("alice", "nope"), ("mallory", "pw1")] {
        let response = app
            .clone()
            .oneshot(create_request(
                "POST",
                "/api/submitter/login",
                Some(json!({ "login": login, "password": password })),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
        bodies.push(extract_json_response(response).await);
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn test_malformed_body_gets_json_error() {
    let app = test_app().await;

    for uri in ["/api/submitter/register", "/api/reviewer/login"] {
        let response = app
            .clone()
            .oneshot(create_request("POST", uri, Some(json!({ "login": "alice" })), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(response.headers()[CONTENT_TYPE].to_str().unwrap(), "application/json");

        let body = extract_json_response(response).await;
        assert_eq!(body["error"], "bad_request");
        assert!(body["message"].as_str().unwrap().contains("password"));
    }
}

#[tokio::test]
async fn test_failed_login_with_stale_token_has_no_challenge() {
    let app = test_app().await;
    register(&app, "submitter", "alice", "pw1").await;

    let response = app
        .clone()
        .oneshot(create_request(
            "POST",
            "/api/submitter/login",
            Some(json!({ "login": "alice", "password": "wrong" })),
            Some("stale.garbage.token"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    assert_eq!(extract_json_response(response).await["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_missing_token_is_unauthenticated() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(create_request("GET", "/api/reviewer/assignments", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[WWW_AUTHENTICATE].to_str().unwrap(), "Bearer");
    assert_eq!(extract_json_response(response).await["error"], "unauthenticated");
}

#[tokio::test]
async fn test_wrong_role_is_forbidden() {
    let app = test_app().await;
    register(&app, "submitter", "alice", "pw1").await;
    let token = login(&app, "submitter", "alice", "pw1").await;

    for (method, uri) in [
        ("GET", "/api/reviewer/assignments"),
        ("POST", "/api/reviewer/assignments/any/accept"),
        ("POST", "/api/reviewer/assignments/any/reject"),
    ] {
        let response = app
            .clone()
            .oneshot(create_request(method, uri, None, Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_tokens_from_other_keys_are_invalid() {
    let app = test_app().await;
    let id = register(&app, "reviewer", "bob", "pw2").await;

    let foreign = TokenCodec::new(b"a-completely-different-signing-key!!", Duration::from_secs(600))
        .issue(&id, Role::Reviewer)
        .unwrap();

    for token in [foreign.as_str(), "not.a.jwt", "garbage"] {
        let response = app
            .clone()
            .oneshot(create_request("GET", "/api/auth/me", None, Some(token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[WWW_AUTHENTICATE].to_str().unwrap(),
            r#"Bearer error="invalid_token""#
        );
    }
}

#[tokio::test]
async fn test_expired_token_is_invalid() {
    let app = test_app().await;
    let id = register(&app, "reviewer", "bob", "pw2").await;

    let expired = TokenCodec::new(SECRET.as_bytes(), Duration::ZERO)
        .issue(&id, Role::Reviewer)
        .unwrap();

    let response = app
        .clone()
        .oneshot(create_request("GET", "/api/reviewer/assignments", None, Some(&expired)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()[WWW_AUTHENTICATE].to_str().unwrap(),
        r#"Bearer error="invalid_token""#
    );
    // The gate reports the request as unauthenticated; the challenge names the cause
    assert_eq!(extract_json_response(response).await["error"], "unauthenticated");
}

#[tokio::test]
async fn test_public_routes_ignore_bad_tokens() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(create_request("GET", "/api/health", None, Some("garbage")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(create_request("GET", "/nowhere", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
