//! Shared application state

use crate::{WebConfig, WebResult};
use portal_applications::PortalApplication;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: WebConfig,
    pub application: Arc<PortalApplication>,
}

impl AppState {
    /// Build the application from `config`. A configured database that cannot
    /// be opened is an error; there is no fallback to memory.
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let application = PortalApplication::builder(config.auth.clone())
            .with_database_url(config.database_url.clone())
            .build()
            .await?;

        info!(
            persistent = config.database_url.is_some(),
            "Application state initialized"
        );

        Ok(Self {
            config,
            application: Arc::new(application),
        })
    }
}
