//! Portal Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use portal_core::AuthConfig;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main portal server
pub struct PortalServer {
    config: WebConfig,
    state: AppState,
}

impl PortalServer {
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting portal server");
        info!("Server address: http://{}", address);
        info!("Development mode: {}", self.config.dev_mode);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server stopped");
        Ok(())
    }

    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}

/// Builder for PortalServer
pub struct PortalServerBuilder {
    config: WebConfig,
}

impl PortalServerBuilder {
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            config: WebConfig::new(auth),
        }
    }

    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.config.database_url = Some(database_url.into());
        self
    }

    pub async fn build(self) -> WebResult<PortalServer> {
        PortalServer::new(self.config).await
    }
}

impl From<WebConfig> for PortalServerBuilder {
    fn from(config: WebConfig) -> Self {
        Self { config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AuthConfig {
        AuthConfig::new("k".repeat(32), 3600)
    }

    #[tokio::test]
    async fn test_server_creation() {
        let server = PortalServer::new(WebConfig::new(auth())).await;
        assert!(server.is_ok());
    }

    #[test]
    fn test_server_builder() {
        let builder = PortalServerBuilder::new(auth())
            .host("localhost")
            .port(3000)
            .dev_mode(true)
            .database_url("sqlite://portal.db");

        assert_eq!(builder.config.host, "localhost");
        assert_eq!(builder.config.port, 3000);
        assert!(builder.config.dev_mode);
        assert_eq!(builder.config.address(), "localhost:3000");
    }

    #[tokio::test]
    async fn test_builder_in_memory() {
        let server = PortalServerBuilder::new(auth()).port(0).build().await.unwrap();
        assert_eq!(server.config().port, 0);
        assert!(server.state().config.database_url.is_none());
    }
}
