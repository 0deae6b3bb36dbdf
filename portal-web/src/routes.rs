//! Route definitions for the portal API

use crate::{auth, handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Routes mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Public
        .route("/submitter/register", post(auth::handlers::register_submitter))
        .route("/reviewer/register", post(auth::handlers::register_reviewer))
        .route("/submitter/login", post(auth::handlers::login))
        .route("/reviewer/login", post(auth::handlers::login))
        // Any role
        .route("/auth/me", get(auth::handlers::me))
        // Submitter
        .route(
            "/submitter/reviewers",
            get(handlers::assignments::list_reviewers),
        )
        .route(
            "/submitter/assignments",
            post(handlers::assignments::upload_assignment),
        )
        // Reviewer
        .route(
            "/reviewer/assignments",
            get(handlers::assignments::list_assigned),
        )
        .route(
            "/reviewer/assignments/{id}/accept",
            post(handlers::assignments::accept_assignment),
        )
        .route(
            "/reviewer/assignments/{id}/reject",
            post(handlers::assignments::reject_assignment),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WebConfig;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use portal_core::AuthConfig;
    use tower::ServiceExt;

    async fn state() -> AppState {
        AppState::new(WebConfig::new(AuthConfig::new("r".repeat(32), 600)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let app = api_routes().with_state(state().await);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_role_routes_reject_without_middleware_context() {
        let app = api_routes().with_state(state().await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/reviewer/assignments")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
