//! Core data type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier of a registered identity
pub type IdentityId = String;

/// Role assigned to an identity at registration. Never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Submitter,
    Reviewer,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Submitter, Role::Reviewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Submitter => "SUBMITTER",
            Role::Reviewer => "REVIEWER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SUBMITTER" => Ok(Role::Submitter),
            "REVIEWER" => Ok(Role::Reviewer),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// A persisted account record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    /// Globally unique login name
    pub login: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Create a new identity with a fresh id. `password_hash` must already be hashed.
    pub fn new(login: impl Into<String>, password_hash: impl Into<String>, role: Role) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            login: login.into(),
            password_hash: password_hash.into(),
            role,
            created_at: Utc::now(),
        }
    }
}

/// Review state of a submitted assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Rejected,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "PENDING",
            AssignmentStatus::Accepted => "ACCEPTED",
            AssignmentStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(AssignmentStatus::Pending),
            "ACCEPTED" => Ok(AssignmentStatus::Accepted),
            "REJECTED" => Ok(AssignmentStatus::Rejected),
            _ => Err(format!("Unknown assignment status: {}", s)),
        }
    }
}

/// A task submitted by a submitter to a chosen reviewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub submitter_id: IdentityId,
    pub submitter_login: String,
    pub task: String,
    pub reviewer_id: IdentityId,
    pub reviewer_login: String,
    pub status: AssignmentStatus,
    pub submitted_at: DateTime<Utc>,
}

impl Assignment {
    pub fn pending(submitter: &Identity, reviewer: &Identity, task: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            submitter_id: submitter.id.clone(),
            submitter_login: submitter.login.clone(),
            task: task.into(),
            reviewer_id: reviewer.id.clone(),
            reviewer_login: reviewer.login.clone(),
            status: AssignmentStatus::Pending,
            submitted_at: Utc::now(),
        }
    }
}
