use crate::auth::{Capability, Principal};
use crate::{ApplicationError, ApplicationResult};
use chrono::Utc;
use portal_core::{
    Assignment, AssignmentStatus, AssignmentStore, CredentialStore, IdentityId, Role,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Upload payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub task: String,
    pub reviewer_id: IdentityId,
}

/// Public view of a reviewer, offered to submitters when picking one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerSummary {
    pub id: IdentityId,
    pub login: String,
}

#[derive(Clone)]
pub struct AssignmentManager {
    assignments: Arc<dyn AssignmentStore>,
    identities: Arc<dyn CredentialStore>,
}

impl AssignmentManager {
    pub fn new(assignments: Arc<dyn AssignmentStore>, identities: Arc<dyn CredentialStore>) -> Self {
        Self {
            assignments,
            identities,
        }
    }

    /// Store a new PENDING assignment from `submitter` to the requested reviewer.
    pub async fn upload(
        &self,
        submitter: &Principal,
        request: AssignmentRequest,
    ) -> ApplicationResult<Assignment> {
        submitter.require(Capability::SubmitAssignment)?;

        let task = request.task.trim();
        if task.is_empty() {
            return Err(ApplicationError::validation("task", "Task must not be empty"));
        }

        let reviewer = self
            .identities
            .find_by_id(&request.reviewer_id)
            .await?
            .filter(|identity| identity.role == Role::Reviewer)
            .ok_or_else(|| ApplicationError::InvalidReviewer {
                reviewer_id: request.reviewer_id.clone(),
            })?;

        let assignment = Assignment {
            id: uuid::Uuid::new_v4().to_string(),
            submitter_id: submitter.id.clone(),
            submitter_login: submitter.login.clone(),
            task: task.to_string(),
            reviewer_id: reviewer.id,
            reviewer_login: reviewer.login,
            status: AssignmentStatus::Pending,
            submitted_at: Utc::now(),
        };
        self.assignments.save(&assignment).await?;

        info!(
            assignment_id = %assignment.id,
            submitter = %submitter.id,
            reviewer = %assignment.reviewer_id,
            "Assignment uploaded"
        );
        Ok(assignment)
    }

    pub async fn list_reviewers(&self, caller: &Principal) -> ApplicationResult<Vec<ReviewerSummary>> {
        caller.require(Capability::ListReviewers)?;

        let reviewers = self.identities.find_by_role(Role::Reviewer).await?;
        Ok(reviewers
            .into_iter()
            .map(|identity| ReviewerSummary {
                id: identity.id,
                login: identity.login,
            })
            .collect())
    }

    /// Assignments addressed to `reviewer`, oldest first
    pub async fn assigned_to(&self, reviewer: &Principal) -> ApplicationResult<Vec<Assignment>> {
        reviewer.require(Capability::ViewAssignedWork)?;
        Ok(self.assignments.find_by_reviewer(&reviewer.id).await?)
    }

    pub async fn accept(&self, reviewer: &Principal, id: &str) -> ApplicationResult<Assignment> {
        self.decide(reviewer, id, AssignmentStatus::Accepted).await
    }

    pub async fn reject(&self, reviewer: &Principal, id: &str) -> ApplicationResult<Assignment> {
        self.decide(reviewer, id, AssignmentStatus::Rejected).await
    }

    // Any reviewer may decide any assignment; access is role-based only.
    async fn decide(
        &self,
        reviewer: &Principal,
        id: &str,
        status: AssignmentStatus,
    ) -> ApplicationResult<Assignment> {
        reviewer.require(Capability::DecideAssignment)?;

        let mut assignment = self
            .assignments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found(format!("assignment {}", id)))?;

        if assignment.reviewer_id != reviewer.id {
            debug!(
                assignment_id = %id,
                addressed_to = %assignment.reviewer_id,
                decided_by = %reviewer.id,
                "Assignment decided by a reviewer other than the addressee"
            );
        }

        assignment.status = status;
        self.assignments.save(&assignment).await?;

        info!(assignment_id = %id, status = %status, reviewer = %reviewer.id, "Assignment decided");
        Ok(assignment)
    }
}
