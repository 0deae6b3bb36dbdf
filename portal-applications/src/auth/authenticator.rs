//! Per-request bearer token resolution
//!
//! Every failure here is absorbed into the returned [`RequestContext`]; nothing
//! propagates. Denial happens later, at the [`AccessGate`](super::AccessGate).

use super::error::{AuthError, AuthResult};
use super::principal::Principal;
use super::token::TokenCodec;
use portal_core::CredentialStore;
use std::sync::Arc;
use tracing::debug;

pub const BEARER_SCHEME: &str = "Bearer";

/// Outcome of authenticating one request
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AuthState {
    /// No bearer token was presented
    #[default]
    Anonymous,
    /// A token was presented but could not be resolved to a principal
    Rejected(AuthError),
    Authenticated(Principal),
}

/// Request-scoped security context. Owned by the request and dropped with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    state: AuthState,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            state: AuthState::Authenticated(principal),
        }
    }

    pub fn rejected(error: AuthError) -> Self {
        Self {
            state: AuthState::Rejected(error),
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn principal(&self) -> Option<&Principal> {
        match &self.state {
            AuthState::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }

    pub fn into_principal(self) -> Option<Principal> {
        match self.state {
            AuthState::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }

    /// Why a presented token was not accepted, if one was presented
    pub fn rejection(&self) -> Option<&AuthError> {
        match &self.state {
            AuthState::Rejected(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }
}

/// Resolves `Authorization: Bearer <token>` into a [`RequestContext`].
#[derive(Clone)]
pub struct RequestAuthenticator {
    codec: Arc<TokenCodec>,
    store: Arc<dyn CredentialStore>,
}

impl RequestAuthenticator {
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn CredentialStore>) -> Self {
        Self { codec, store }
    }

    /// The token of a `Bearer` authorization value. Other schemes and empty
    /// tokens count as no token at all.
    pub fn extract_bearer(authorization: &str) -> Option<&str> {
        let (scheme, token) = authorization.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
            return None;
        }
        let token = token.trim();
        (!token.is_empty()).then_some(token)
    }

    /// Verify `token` and load the identity it names. The stored role wins over the claim.
    pub async fn resolve(&self, token: &str) -> AuthResult<Principal> {
        let claims = self.codec.parse(token)?;
        let identity = self
            .store
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AuthError::IdentityNotFound)?;

        if identity.role != claims.role {
            debug!(
                subject = %claims.sub,
                claimed = %claims.role,
                stored = %identity.role,
                "Token role differs from stored role; using stored role"
            );
        }

        Ok(Principal::from_identity(&identity))
    }

    /// Never fails: absent tokens give `Anonymous`, bad ones `Rejected`.
    pub async fn authenticate(&self, authorization: Option<&str>) -> RequestContext {
        let Some(token) = authorization.and_then(Self::extract_bearer) else {
            return RequestContext::anonymous();
        };

        match self.resolve(token).await {
            Ok(principal) => {
                debug!(subject = %principal.id, role = %principal.role, "Request authenticated");
                RequestContext::authenticated(principal)
            }
            Err(error) => {
                debug!(reason = %error, "Bearer token rejected; continuing unauthenticated");
                RequestContext::rejected(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bearer_tokens_only() {
        assert_eq!(RequestAuthenticator::extract_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(RequestAuthenticator::extract_bearer("bearer  abc "), Some("abc"));
        assert_eq!(RequestAuthenticator::extract_bearer("Bearer "), None);
        assert_eq!(RequestAuthenticator::extract_bearer("Bearer"), None);
        assert_eq!(RequestAuthenticator::extract_bearer("Basic dXNlcjpwdw=="), None);
        assert_eq!(RequestAuthenticator::extract_bearer(""), None);
    }

    #[test]
    fn context_accessors() {
        let principal = Principal::new("U1", "alice", portal_core::Role::Submitter);
        let context = RequestContext::authenticated(principal.clone());
        assert!(context.is_authenticated());
        assert_eq!(context.principal(), Some(&principal));
        assert!(context.rejection().is_none());

        let rejected = RequestContext::rejected(AuthError::invalid_token("token expired"));
        assert!(rejected.principal().is_none());
        assert!(rejected.rejection().is_some());

        assert_eq!(RequestContext::default().state(), &AuthState::Anonymous);
    }
}
