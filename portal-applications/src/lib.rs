//! Portal Applications - authentication, access control and assignment review
//!
//! This crate holds everything between the storage collaborators defined in
//! portal-core and the presentation layers (portal-web, portal-cli):
//!
//! - **auth**: stateless bearer-token authentication and role-based access control
//! - **assignment**: submission and review workflow gated by the caller's role
//! - **storage**: in-memory and SQLite implementations of the store traits
//!
//! [`PortalApplication`] wires them together from an [`AuthConfig`].

pub mod assignment;
pub mod auth;
pub mod storage;

pub use assignment::{AssignmentManager, AssignmentRequest, ReviewerSummary};
pub use auth::{
    AccessDecision, AccessGate, AuthError, AuthResult, AuthState, AuthenticationService,
    Capability, Claims, PasswordVerifier, Principal, RequestAuthenticator, RequestContext,
    Requirement, TokenCodec,
};

use portal_core::{AssignmentStore, AuthConfig, CredentialStore, PortalError};
use std::sync::Arc;
use tracing::{info, warn};

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Core error: {0}")]
    Core(#[from] PortalError),

    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Invalid reviewer: {reviewer_id}")]
    InvalidReviewer { reviewer_id: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

impl ApplicationError {
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Authentication, authorization and assignment services sharing one set of stores
#[derive(Clone)]
pub struct PortalApplication {
    pub auth: AuthenticationService,
    pub authenticator: RequestAuthenticator,
    pub assignments: AssignmentManager,
    codec: Arc<TokenCodec>,
}

impl PortalApplication {
    pub fn builder(auth_config: AuthConfig) -> PortalApplicationBuilder {
        PortalApplicationBuilder::new(auth_config)
    }

    /// In-memory stores; state is lost when the process exits.
    pub async fn in_memory(auth_config: AuthConfig) -> ApplicationResult<Self> {
        Self::builder(auth_config).build().await
    }

    pub fn codec(&self) -> &Arc<TokenCodec> {
        &self.codec
    }
}

/// Builder for PortalApplication
pub struct PortalApplicationBuilder {
    auth_config: AuthConfig,
    credentials: Option<Arc<dyn CredentialStore>>,
    assignments: Option<Arc<dyn AssignmentStore>>,
    database_url: Option<String>,
}

impl PortalApplicationBuilder {
    pub fn new(auth_config: AuthConfig) -> Self {
        Self {
            auth_config,
            credentials: None,
            assignments: None,
            database_url: None,
        }
    }

    pub fn with_credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    pub fn with_assignment_store(mut self, store: Arc<dyn AssignmentStore>) -> Self {
        self.assignments = Some(store);
        self
    }

    /// Use SQLite for any store not supplied explicitly
    pub fn with_database_url(mut self, database_url: Option<String>) -> Self {
        self.database_url = database_url;
        self
    }

    pub async fn build(self) -> ApplicationResult<PortalApplication> {
        let codec = Arc::new(TokenCodec::from_config(&self.auth_config)?);

        let (credentials, assignments) = match (self.credentials, self.assignments) {
            (Some(credentials), Some(assignments)) => (credentials, assignments),
            (credentials, assignments) => {
                let (default_credentials, default_assignments) =
                    Self::default_stores(self.database_url.as_deref()).await?;
                (
                    credentials.unwrap_or(default_credentials),
                    assignments.unwrap_or(default_assignments),
                )
            }
        };

        info!(ttl_secs = codec.ttl().as_secs(), "Portal application initialized");

        Ok(PortalApplication {
            auth: AuthenticationService::new(credentials.clone(), codec.clone()),
            authenticator: RequestAuthenticator::new(codec.clone(), credentials.clone()),
            assignments: AssignmentManager::new(assignments, credentials),
            codec,
        })
    }

    async fn default_stores(
        database_url: Option<&str>,
    ) -> ApplicationResult<(Arc<dyn CredentialStore>, Arc<dyn AssignmentStore>)> {
        match database_url {
            #[cfg(feature = "sqlite")]
            Some(url) => {
                let storage = storage::SqliteStorage::connect(url).await?;
                Ok((
                    Arc::new(storage.credentials()),
                    Arc::new(storage.assignments()),
                ))
            }
            #[cfg(not(feature = "sqlite"))]
            Some(url) => Err(ApplicationError::config(format!(
                "Database URL {} given but the sqlite feature is disabled",
                url
            ))),
            None => {
                warn!("No database configured, using in-memory stores; data is lost on restart");
                Ok((
                    Arc::new(storage::MemoryCredentialStore::new()),
                    Arc::new(storage::MemoryAssignmentStore::new()),
                ))
            }
        }
    }
}
