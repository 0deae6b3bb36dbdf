//! Salted one-way password hashing (Argon2id, PHC string format)

use super::error::{AuthError, AuthResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier as _, SaltString},
    Argon2,
};
use std::sync::LazyLock;

/// Hash of a throwaway secret, verified against when a login is unknown so the
/// response time matches that of a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| PasswordVerifier.hash("portal-dummy-secret").ok());

#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordVerifier;

impl PasswordVerifier {
    pub fn hash(&self, secret: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing {
                message: e.to_string(),
            })
    }

    /// `Ok(false)` on mismatch. A stored hash that cannot be parsed is an error.
    pub fn verify(&self, secret: &str, stored_hash: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hashing {
            message: format!("stored hash is malformed: {}", e),
        })?;

        match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Hashing {
                message: e.to_string(),
            }),
        }
    }

    /// Burn one verification's worth of work; the outcome is ignored.
    pub fn verify_dummy(&self, secret: &str) {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = self.verify(secret, hash);
        }
    }
}
