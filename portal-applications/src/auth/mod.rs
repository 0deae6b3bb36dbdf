//! Authentication and Authorization Module
//!
//! Stateless bearer-token authentication with role-based access control:
//! - [`AuthenticationService`] registers identities and exchanges credentials for tokens
//! - [`TokenCodec`] signs and verifies HS256 tokens with a process-wide key
//! - [`RequestAuthenticator`] turns an `Authorization` header into a [`RequestContext`]
//! - [`AccessGate`] admits or denies a request based on the caller's role
//!
//! Token problems never fail a request on their own: the request carries on as
//! anonymous and is denied at the gate if the operation needs a principal.

pub mod authenticator;
pub mod error;
pub mod gate;
pub mod password;
pub mod principal;
pub mod service;
pub mod token;

pub use authenticator::{AuthState, RequestAuthenticator, RequestContext, BEARER_SCHEME};
pub use error::{AuthError, AuthResult};
pub use gate::{AccessDecision, AccessGate, Requirement};
pub use password::PasswordVerifier;
pub use principal::{Capability, Principal};
pub use service::AuthenticationService;
pub use token::{Claims, TokenCodec};
