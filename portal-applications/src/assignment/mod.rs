//! Assignment submission and review
//!
//! Submitters upload a task addressed to a reviewer of their choice; reviewers
//! see what was addressed to them and accept or reject it. Every operation takes
//! the caller's [`Principal`](crate::auth::Principal) and checks its capabilities.

pub mod manager;

pub use manager::{AssignmentManager, AssignmentRequest, ReviewerSummary};
