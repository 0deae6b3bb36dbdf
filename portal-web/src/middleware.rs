//! Request authentication middleware

use crate::error::WWW_AUTHENTICATE_INVALID_TOKEN;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        HeaderValue, StatusCode,
    },
    middleware::Next,
    response::Response,
};
use portal_applications::{AuthError, RequestContext};
use tracing::debug;

/// Attach a [`RequestContext`] to every request.
///
/// Never rejects: a missing or bad token leaves the request unauthenticated and
/// the role extractors deny it later. When a presented token was rejected and a
/// gate answers 401 with a Bearer challenge, the challenge names `invalid_token`.
pub async fn authenticate_request(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = match request.headers().get(AUTHORIZATION) {
        None => RequestContext::anonymous(),
        Some(value) => match value.to_str() {
            Ok(authorization) => {
                state
                    .application
                    .authenticator
                    .authenticate(Some(authorization))
                    .await
            }
            Err(_) => {
                debug!("Authorization header is not valid UTF-8");
                RequestContext::rejected(AuthError::invalid_token(
                    "authorization header is not valid UTF-8",
                ))
            }
        },
    };

    let token_rejected = context.rejection().is_some();
    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;
    // Only sharpen a gate's Bearer challenge; unchallenged 401s (bad login) stay as they are.
    if token_rejected
        && response.status() == StatusCode::UNAUTHORIZED
        && response.headers().contains_key(WWW_AUTHENTICATE)
    {
        response.headers_mut().insert(
            WWW_AUTHENTICATE,
            HeaderValue::from_static(WWW_AUTHENTICATE_INVALID_TOKEN),
        );
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CurrentPrincipal;
    use axum::{body::Body, http::Request as HttpRequest, middleware::from_fn_with_state, routing::get, Router};
    use portal_core::AuthConfig;
    use tower::ServiceExt;

    async fn app() -> (Router, AppState) {
        let state = AppState::new(crate::WebConfig::new(AuthConfig::new("m".repeat(32), 600)))
            .await
            .unwrap();
        let router = Router::new()
            .route("/open", get(|| async { "ok" }))
            .route("/me", get(|CurrentPrincipal(p): CurrentPrincipal| async move { p.login }))
            .route(
                "/bad-login",
                get(|| async { crate::ApiError::from(AuthError::InvalidCredential) }),
            )
            .layer(from_fn_with_state(state.clone(), authenticate_request))
            .with_state(state.clone());
        (router, state)
    }

    #[tokio::test]
    async fn bad_token_does_not_block_public_routes() {
        let (app, _) = app().await;
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/open")
                    .header(AUTHORIZATION, "Bearer garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn rejected_token_gets_invalid_token_challenge() {
        let (app, _) = app().await;
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/me")
                    .header(AUTHORIZATION, "Bearer garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[WWW_AUTHENTICATE].to_str().unwrap(),
            WWW_AUTHENTICATE_INVALID_TOKEN
        );
    }

    #[tokio::test]
    async fn unchallenged_401_is_left_alone() {
        let (app, _) = app().await;
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/bad-login")
                    .header(AUTHORIZATION, "Bearer stale.garbage.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    }

    #[tokio::test]
    async fn non_utf8_header_is_absorbed() {
        let (app, _) = app().await;
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/me")
                    .header(AUTHORIZATION, HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_header_gets_plain_challenge() {
        let (app, _) = app().await;
        let response = app
            .oneshot(HttpRequest::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE].to_str().unwrap(), "Bearer");
    }
}
