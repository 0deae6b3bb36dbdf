//! Signed, time-bounded bearer tokens (JWT, HS256)

use super::error::{AuthError, AuthResult};
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use portal_core::{AuthConfig, PortalResult, Role};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Claims carried by every issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity id)
    pub sub: String,
    pub role: Role,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration time (unix seconds)
    pub exp: i64,
}

impl Claims {
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }
}

/// Issues and verifies tokens with a process-wide symmetric key.
///
/// Built once at startup and shared behind an `Arc`; nothing in it changes afterwards.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Validate the auth section, then build the codec from it.
    pub fn from_config(config: &AuthConfig) -> PortalResult<Self> {
        config.validate()?;
        Ok(Self::new(config.jwt_secret.as_bytes(), config.token_ttl()))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `subject_id` valid from now until now + TTL.
    pub fn issue(&self, subject_id: &str, role: Role) -> AuthResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject_id.to_string(),
            role,
            iat: now,
            exp: now.saturating_add(self.ttl.as_secs() as i64),
        };
        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &Claims) -> AuthResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(|e| {
            AuthError::Signing {
                message: e.to_string(),
            }
        })
    }

    /// Verify signature and expiry. A token is accepted only while `exp > now`.
    pub fn parse(&self, token: &str) -> AuthResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "token expired",
                ErrorKind::InvalidSignature => "signature mismatch",
                ErrorKind::InvalidAlgorithm => "unexpected signing algorithm",
                ErrorKind::MissingRequiredClaim(_) => "required claim missing",
                _ => "malformed token",
            };
            debug!(error = %e, reason, "Token verification failed");
            AuthError::invalid_token(reason)
        })?;

        // The library only rejects once `exp < now`; the boundary second is expired too.
        if data.claims.is_expired() {
            return Err(AuthError::invalid_token("token expired"));
        }

        Ok(data.claims)
    }
}
