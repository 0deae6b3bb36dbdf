//! Access-gate extractors
//!
//! Declaring one of these as a handler argument is the endpoint's role
//! requirement. The gate runs during extraction, so a denied request never
//! reaches the handler body.
//!
//! ```ignore
//! async fn accept(Authorized { principal, .. }: Authorized<ReviewerOnly>) -> ... { }
//! ```

pub mod handlers;

use crate::error::ApiError;
use axum::{extract::FromRequestParts, http::request::Parts};
use portal_applications::{AccessGate, Principal, RequestContext, Requirement};
use std::marker::PhantomData;

/// Role set admitted by an [`Authorized`] extractor
pub trait RoleSet: Send + Sync + 'static {
    const REQUIREMENT: Requirement;
}

pub struct SubmitterOnly;
pub struct ReviewerOnly;
/// Any authenticated principal, whatever its role
pub struct AnyRole;

impl RoleSet for SubmitterOnly {
    const REQUIREMENT: Requirement = Requirement::SUBMITTER;
}

impl RoleSet for ReviewerOnly {
    const REQUIREMENT: Requirement = Requirement::REVIEWER;
}

impl RoleSet for AnyRole {
    const REQUIREMENT: Requirement = Requirement::Authenticated;
}

/// The request's principal, admitted by role set `R`
pub struct Authorized<R: RoleSet> {
    pub principal: Principal,
    _roles: PhantomData<R>,
}

impl<R: RoleSet> Authorized<R> {
    pub fn into_inner(self) -> Principal {
        self.principal
    }
}

impl<R: RoleSet> std::fmt::Debug for Authorized<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorized")
            .field("principal", &self.principal)
            .finish()
    }
}

fn request_context(parts: &Parts) -> RequestContext {
    parts
        .extensions
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default()
}

impl<S, R> FromRequestParts<S> for Authorized<R>
where
    S: Send + Sync,
    R: RoleSet,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = request_context(parts);
        let principal = AccessGate::enforce(&context, R::REQUIREMENT)?;

        Ok(Self {
            principal: principal.clone(),
            _roles: PhantomData,
        })
    }
}

pub type SubmitterPrincipal = Authorized<SubmitterOnly>;
pub type ReviewerPrincipal = Authorized<ReviewerOnly>;

/// Any authenticated principal
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authorized { principal, .. } = Authorized::<AnyRole>::from_request_parts(parts, state).await?;
        Ok(Self(principal))
    }
}

/// The principal if one is attached; never rejects
#[derive(Debug, Clone)]
pub struct OptionalPrincipal(pub Option<Principal>);

impl<S> FromRequestParts<S> for OptionalPrincipal
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(request_context(parts).into_principal()))
    }
}
