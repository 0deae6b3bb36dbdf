//! Authentication error taxonomy

use portal_core::{PortalError, Role};
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Failures of registration, login, token handling and access checks.
///
/// `Store`, `Hashing` and `Signing` are infrastructure failures; every other
/// variant is a rejected operation the caller can act on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("login '{login}' is already registered")]
    DuplicateIdentity { login: String },

    #[error("no identity matches the supplied login")]
    IdentityNotFound,

    #[error("credential does not match")]
    InvalidCredential,

    #[error("invalid token: {reason}")]
    InvalidToken { reason: String },

    #[error("authentication required")]
    Unauthenticated,

    #[error("role {actual} is not allowed to perform this operation")]
    Forbidden { actual: Role, allowed: Vec<Role> },

    #[error("credential store failure: {message}")]
    Store { message: String },

    #[error("password hashing failed: {message}")]
    Hashing { message: String },

    #[error("token signing failed: {message}")]
    Signing { message: String },
}

impl AuthError {
    pub fn invalid_token(reason: impl Into<String>) -> Self {
        AuthError::InvalidToken {
            reason: reason.into(),
        }
    }

    /// True for failures caused by the caller rather than by infrastructure
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            AuthError::Store { .. } | AuthError::Hashing { .. } | AuthError::Signing { .. }
        )
    }
}

impl From<PortalError> for AuthError {
    fn from(err: PortalError) -> Self {
        err.log();
        AuthError::Store {
            message: err.to_string(),
        }
    }
}
