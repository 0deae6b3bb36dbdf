//! Assignment endpoints for submitters and reviewers

use crate::auth::{ReviewerPrincipal, SubmitterPrincipal};
use crate::{error::ApiError, handlers::ApiJson, AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use portal_applications::{AssignmentRequest, ReviewerSummary};
use portal_core::Assignment;

pub async fn list_reviewers(
    State(state): State<AppState>,
    submitter: SubmitterPrincipal,
) -> Result<Json<Vec<ReviewerSummary>>, ApiError> {
    let reviewers = state
        .application
        .assignments
        .list_reviewers(&submitter.principal)
        .await?;
    Ok(Json(reviewers))
}

pub async fn upload_assignment(
    State(state): State<AppState>,
    submitter: SubmitterPrincipal,
    ApiJson(request): ApiJson<AssignmentRequest>,
) -> Result<Json<Assignment>, ApiError> {
    let assignment = state
        .application
        .assignments
        .upload(&submitter.principal, request)
        .await?;
    Ok(Json(assignment))
}

pub async fn list_assigned(
    State(state): State<AppState>,
    reviewer: ReviewerPrincipal,
) -> Result<Json<Vec<Assignment>>, ApiError> {
    let assignments = state
        .application
        .assignments
        .assigned_to(&reviewer.principal)
        .await?;
    Ok(Json(assignments))
}

pub async fn accept_assignment(
    State(state): State<AppState>,
    reviewer: ReviewerPrincipal,
    Path(id): Path<String>,
) -> Result<Json<Assignment>, ApiError> {
    let assignment = state
        .application
        .assignments
        .accept(&reviewer.principal, &id)
        .await?;
    Ok(Json(assignment))
}

pub async fn reject_assignment(
    State(state): State<AppState>,
    reviewer: ReviewerPrincipal,
    Path(id): Path<String>,
) -> Result<Json<Assignment>, ApiError> {
    let assignment = state
        .application
        .assignments
        .reject(&reviewer.principal, &id)
        .await?;
    Ok(Json(assignment))
}
