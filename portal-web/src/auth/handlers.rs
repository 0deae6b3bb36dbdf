//! Registration, login and identity endpoints

use super::CurrentPrincipal;
use crate::{error::ApiError, handlers::ApiJson, AppState};
use axum::{extract::State, Json};
use portal_applications::{Capability, Principal};
use portal_core::{IdentityId, Role};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Login name and password. `username` is accepted for `login`.
#[derive(Deserialize)]
pub struct CredentialRequest {
    #[serde(alias = "username")]
    pub login: String,
    pub password: String,
}

impl CredentialRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.login.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::bad_request("Login and password are required"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: IdentityId,
    pub login: String,
    pub role: Role,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: IdentityId,
    pub login: String,
    pub role: Role,
    pub capabilities: Vec<Capability>,
}

impl From<Principal> for MeResponse {
    fn from(principal: Principal) -> Self {
        let mut capabilities: Vec<Capability> = principal.capabilities.into_iter().collect();
        capabilities.sort_by_key(|c| c.to_string());
        Self {
            id: principal.id,
            login: principal.login,
            role: principal.role,
            capabilities,
        }
    }
}

async fn register(
    state: &AppState,
    request: CredentialRequest,
    role: Role,
) -> Result<Json<RegisterResponse>, ApiError> {
    request.validate()?;
    let login = request.login.trim();

    let id = state
        .application
        .auth
        .register(login, &request.password, role)
        .await?;

    info!(id = %id, role = %role, "Identity registered");
    Ok(Json(RegisterResponse {
        id,
        login: login.to_string(),
        role,
        message: "Registered successfully".to_string(),
    }))
}

pub async fn register_submitter(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    register(&state, request, Role::Submitter).await
}

pub async fn register_reviewer(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    register(&state, request, Role::Reviewer).await
}

/// Shared by both role paths: the role comes from the stored identity, not the URL.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    request.validate()?;

    let token = state
        .application
        .auth
        .login(request.login.trim(), &request.password)
        .await?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.application.codec().ttl().as_secs(),
    }))
}

pub async fn me(CurrentPrincipal(principal): CurrentPrincipal) -> Json<MeResponse> {
    Json(principal.into())
}
