//! In-memory stores for development and tests

use async_trait::async_trait;
use portal_core::{
    conflict_error, Assignment, AssignmentStore, CredentialStore, Identity, PortalResult, Role,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct IdentityTable {
    by_id: HashMap<String, Identity>,
    /// login -> id
    logins: HashMap<String, String>,
}

/// Identities held in process memory. Cloning shares the same table.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    table: Arc<RwLock<IdentityTable>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_login(&self, login: &str) -> PortalResult<Option<Identity>> {
        let table = self.table.read().await;
        Ok(table
            .logins
            .get(login)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn exists_by_login(&self, login: &str) -> PortalResult<bool> {
        Ok(self.table.read().await.logins.contains_key(login))
    }

    async fn find_by_id(&self, id: &str) -> PortalResult<Option<Identity>> {
        Ok(self.table.read().await.by_id.get(id).cloned())
    }

    async fn save(&self, identity: &Identity) -> PortalResult<()> {
        let mut table = self.table.write().await;
        if table.logins.contains_key(&identity.login) || table.by_id.contains_key(&identity.id) {
            return Err(conflict_error!(
                format!("identity '{}'", identity.login),
                "memory_credential_store"
            ));
        }
        table
            .logins
            .insert(identity.login.clone(), identity.id.clone());
        table.by_id.insert(identity.id.clone(), identity.clone());
        Ok(())
    }

    async fn find_by_role(&self, role: Role) -> PortalResult<Vec<Identity>> {
        let table = self.table.read().await;
        let mut identities: Vec<Identity> = table
            .by_id
            .values()
            .filter(|identity| identity.role == role)
            .cloned()
            .collect();
        identities.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(identities)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryAssignmentStore {
    assignments: Arc<RwLock<HashMap<String, Assignment>>>,
}

impl MemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssignmentStore for MemoryAssignmentStore {
    async fn save(&self, assignment: &Assignment) -> PortalResult<()> {
        self.assignments
            .write()
            .await
            .insert(assignment.id.clone(), assignment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> PortalResult<Option<Assignment>> {
        Ok(self.assignments.read().await.get(id).cloned())
    }

    async fn find_by_reviewer(&self, reviewer_id: &str) -> PortalResult<Vec<Assignment>> {
        let mut assignments: Vec<Assignment> = self
            .assignments
            .read()
            .await
            .values()
            .filter(|a| a.reviewer_id == reviewer_id)
            .cloned()
            .collect();
        assignments.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(assignments)
    }
}
