//! Registration and login

use super::error::{AuthError, AuthResult};
use super::password::PasswordVerifier;
use super::token::TokenCodec;
use portal_core::{
    log_operation_error, log_operation_start, log_operation_success, CredentialStore, Identity,
    IdentityId, PortalError, Role,
};
use std::sync::Arc;
use tracing::debug;

/// Orchestrates the credential store, password hashing and token issuance.
#[derive(Clone)]
pub struct AuthenticationService {
    store: Arc<dyn CredentialStore>,
    codec: Arc<TokenCodec>,
    passwords: PasswordVerifier,
}

impl AuthenticationService {
    pub fn new(store: Arc<dyn CredentialStore>, codec: Arc<TokenCodec>) -> Self {
        Self {
            store,
            codec,
            passwords: PasswordVerifier,
        }
    }

    pub fn codec(&self) -> &Arc<TokenCodec> {
        &self.codec
    }

    /// Register a new identity and return its id.
    ///
    /// Performs exactly one store write, and only once the login is known to be free.
    pub async fn register(&self, login: &str, secret: &str, role: Role) -> AuthResult<IdentityId> {
        log_operation_start!("register", login = %login, role = %role);

        if self.store.exists_by_login(login).await? {
            let error = AuthError::DuplicateIdentity {
                login: login.to_string(),
            };
            log_operation_error!("register", error, login = %login);
            return Err(error);
        }

        let hash = self.hash(secret).await?;
        let identity = Identity::new(login, hash, role);

        match self.store.save(&identity).await {
            Ok(()) => {}
            // Lost a race with a concurrent registration of the same login
            Err(PortalError::Conflict { .. }) => {
                return Err(AuthError::DuplicateIdentity {
                    login: login.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        }

        log_operation_success!("register", id = %identity.id, role = %role);
        Ok(identity.id)
    }

    /// Verify a credential and issue a bearer token.
    pub async fn login(&self, login: &str, secret: &str) -> AuthResult<String> {
        let Some(identity) = self.store.find_by_login(login).await? else {
            self.verify_dummy(secret).await;
            debug!(login = %login, "Login for unknown identity");
            return Err(AuthError::IdentityNotFound);
        };

        if !self.verify(secret, &identity.password_hash).await? {
            debug!(id = %identity.id, "Login with wrong credential");
            return Err(AuthError::InvalidCredential);
        }

        let token = self.codec.issue(&identity.id, identity.role)?;
        debug!(id = %identity.id, role = %identity.role, "Issued access token");
        Ok(token)
    }

    // Argon2 runs on the blocking pool.
    async fn hash(&self, secret: &str) -> AuthResult<String> {
        let passwords = self.passwords;
        let secret = secret.to_string();
        tokio::task::spawn_blocking(move || passwords.hash(&secret))
            .await
            .map_err(|e| AuthError::Hashing {
                message: e.to_string(),
            })?
    }

    async fn verify(&self, secret: &str, stored_hash: &str) -> AuthResult<bool> {
        let passwords = self.passwords;
        let secret = secret.to_string();
        let stored_hash = stored_hash.to_string();
        tokio::task::spawn_blocking(move || passwords.verify(&secret, &stored_hash))
            .await
            .map_err(|e| AuthError::Hashing {
                message: e.to_string(),
            })?
    }

    async fn verify_dummy(&self, secret: &str) {
        let passwords = self.passwords;
        let secret = secret.to_string();
        let _ = tokio::task::spawn_blocking(move || passwords.verify_dummy(&secret)).await;
    }
}
