//! Role-based access gate
//!
//! Evaluated after request authentication and before any handler runs. A denied
//! request never reaches the handler.

use super::authenticator::RequestContext;
use super::error::{AuthError, AuthResult};
use super::principal::Principal;
use portal_core::Role;

/// What an operation demands of its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    /// Any authenticated principal
    Authenticated,
    /// An authenticated principal holding one of these roles
    Roles(&'static [Role]),
}

impl Requirement {
    pub const SUBMITTER: Requirement = Requirement::Roles(&[Role::Submitter]);
    pub const REVIEWER: Requirement = Requirement::Roles(&[Role::Reviewer]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Unauthenticated,
    Forbidden,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }
}

pub struct AccessGate;

impl AccessGate {
    /// Decide whether `principal` may invoke an operation open to `allowed_roles`.
    /// An empty role set admits any authenticated principal.
    pub fn authorize(principal: Option<&Principal>, allowed_roles: &[Role]) -> AccessDecision {
        match principal {
            None => AccessDecision::Unauthenticated,
            Some(_) if allowed_roles.is_empty() => AccessDecision::Allowed,
            Some(principal) if allowed_roles.contains(&principal.role) => AccessDecision::Allowed,
            Some(_) => AccessDecision::Forbidden,
        }
    }

    pub fn decide(principal: Option<&Principal>, requirement: Requirement) -> AccessDecision {
        match requirement {
            Requirement::Public => AccessDecision::Allowed,
            Requirement::Authenticated => Self::authorize(principal, &[]),
            Requirement::Roles(roles) => Self::authorize(principal, roles),
        }
    }

    /// Enforce a non-public requirement against a request context, yielding the
    /// principal for the handler.
    pub fn enforce(context: &RequestContext, requirement: Requirement) -> AuthResult<&Principal> {
        let principal = context.principal();
        match (Self::decide(principal, requirement), principal) {
            (AccessDecision::Allowed, Some(principal)) => Ok(principal),
            (AccessDecision::Forbidden, Some(principal)) => Err(AuthError::Forbidden {
                actual: principal.role,
                allowed: match requirement {
                    Requirement::Roles(roles) => roles.to_vec(),
                    _ => Vec::new(),
                },
            }),
            _ => Err(AuthError::Unauthenticated),
        }
    }
}
