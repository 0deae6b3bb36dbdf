//! Core trait definitions
//!
//! Storage collaborators consumed by the authentication core and the
//! assignment workflow. Each call is an independent, atomic operation.

use crate::error::PortalResult;
use crate::types::*;
use async_trait::async_trait;

/// Persistent store of registered identities
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_login(&self, login: &str) -> PortalResult<Option<Identity>>;

    async fn exists_by_login(&self, login: &str) -> PortalResult<bool>;

    async fn find_by_id(&self, id: &str) -> PortalResult<Option<Identity>>;

    /// Persist a new identity. Fails with `PortalError::Conflict` when the login is taken.
    async fn save(&self, identity: &Identity) -> PortalResult<()>;

    async fn find_by_role(&self, role: Role) -> PortalResult<Vec<Identity>>;
}

/// Persistent store of submitted assignments
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Insert or replace by id
    async fn save(&self, assignment: &Assignment) -> PortalResult<()>;

    async fn find_by_id(&self, id: &str) -> PortalResult<Option<Assignment>>;

    /// Assignments addressed to a reviewer, oldest first
    async fn find_by_reviewer(&self, reviewer_id: &str) -> PortalResult<Vec<Assignment>>;
}
