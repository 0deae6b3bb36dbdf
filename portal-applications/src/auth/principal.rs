//! Request-scoped caller identity

use super::error::{AuthError, AuthResult};
use portal_core::{Identity, IdentityId, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Operation classes a role enables
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    SubmitAssignment,
    ListReviewers,
    ViewAssignedWork,
    DecideAssignment,
}

impl Capability {
    pub fn for_role(role: Role) -> &'static [Capability] {
        match role {
            Role::Submitter => &[Capability::SubmitAssignment, Capability::ListReviewers],
            Role::Reviewer => &[Capability::ViewAssignedWork, Capability::DecideAssignment],
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::SubmitAssignment => write!(f, "submit_assignment"),
            Capability::ListReviewers => write!(f, "list_reviewers"),
            Capability::ViewAssignedWork => write!(f, "view_assigned_work"),
            Capability::DecideAssignment => write!(f, "decide_assignment"),
        }
    }
}

/// Who is calling. Built from a verified token plus a fresh identity lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Principal {
    pub id: IdentityId,
    pub login: String,
    pub role: Role,
    pub capabilities: HashSet<Capability>,
}

impl Principal {
    pub fn new(id: impl Into<IdentityId>, login: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            login: login.into(),
            role,
            capabilities: Capability::for_role(role).iter().copied().collect(),
        }
    }

    pub fn from_identity(identity: &Identity) -> Self {
        Self::new(identity.id.clone(), identity.login.clone(), identity.role)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Fail with `Forbidden` unless the role grants `capability`.
    pub fn require(&self, capability: Capability) -> AuthResult<()> {
        if self.can(capability) {
            return Ok(());
        }

        let allowed = Role::ALL
            .into_iter()
            .filter(|role| Capability::for_role(*role).contains(&capability))
            .collect();
        Err(AuthError::Forbidden {
            actual: self.role,
            allowed,
        })
    }
}
