//! HTTP rendering of application errors
//!
//! Every error body is `{"error": <code>, "message": <text>}`.

use axum::{
    extract::rejection::JsonRejection,
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use portal_applications::{ApplicationError, AuthError};
use serde_json::json;
use tracing::error;

pub const WWW_AUTHENTICATE_BEARER: &str = "Bearer";
pub const WWW_AUTHENTICATE_INVALID_TOKEN: &str = r#"Bearer error="invalid_token""#;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(AuthError),

    #[error(transparent)]
    Application(ApplicationError),

    #[error("{message}")]
    BadRequest { message: String },
}

impl ApiError {
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Auth(err) => auth_parts(err),
            ApiError::Application(err) => match err {
                ApplicationError::Auth(err) => auth_parts(err),
                ApplicationError::Validation { message, .. } => {
                    (StatusCode::BAD_REQUEST, "validation_failed", message.clone())
                }
                ApplicationError::InvalidReviewer { .. } => (
                    StatusCode::BAD_REQUEST,
                    "invalid_reviewer",
                    "Invalid reviewer ID".to_string(),
                ),
                ApplicationError::NotFound { message } => {
                    (StatusCode::NOT_FOUND, "not_found", message.clone())
                }
                ApplicationError::Core(_) | ApplicationError::Config { .. } => internal(),
            },
            ApiError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, "bad_request", message.clone())
            }
        }
    }
}

fn auth_parts(err: &AuthError) -> (StatusCode, &'static str, String) {
    match err {
        AuthError::DuplicateIdentity { .. } => (
            StatusCode::CONFLICT,
            "identity_exists",
            "Login is already taken".to_string(),
        ),
        // Unknown login and wrong password look the same from outside.
        AuthError::IdentityNotFound | AuthError::InvalidCredential => (
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Invalid login or password".to_string(),
        ),
        AuthError::InvalidToken { .. } => (
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Invalid or expired token".to_string(),
        ),
        AuthError::Unauthenticated => (
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "Authentication required".to_string(),
        ),
        AuthError::Forbidden { .. } => (
            StatusCode::FORBIDDEN,
            "forbidden",
            "Your role does not permit this operation".to_string(),
        ),
        AuthError::Store { .. } | AuthError::Hashing { .. } | AuthError::Signing { .. } => {
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "Internal server error".to_string(),
    )
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Auth(err) => ApiError::Auth(err),
            other => ApiError::Application(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Request failed");
        }

        let mut response = (status, Json(json!({ "error": code, "message": message }))).into_response();
        if status == StatusCode::UNAUTHORIZED && code != "invalid_credentials" {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static(WWW_AUTHENTICATE_BEARER),
            );
        }
        response
    }
}
