//! Portal Web Server
//!
//! HTTP API for the assignment portal. Every request passes through
//! [`middleware::authenticate_request`], which attaches a
//! [`RequestContext`](portal_applications::RequestContext); handlers declare the
//! role they need through the extractors in [`auth`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use error::ApiError;
pub use server::PortalServer;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    Router,
};
use portal_core::{AuthConfig, PortalConfig};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    Router::new()
        .nest("/api", routes::api_routes())
        .fallback(handlers::not_found)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::authenticate_request,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    pub dev_mode: bool,
    /// SQLite URL; in-memory stores when absent
    pub database_url: Option<String>,
    pub auth: AuthConfig,
}

impl WebConfig {
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
            database_url: None,
            auth,
        }
    }

    pub fn from_portal_config(config: &PortalConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            dev_mode: config.server.dev_mode,
            database_url: config.storage.database_url.clone(),
            auth: config.auth.clone(),
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Application error: {0}")]
    Application(#[from] portal_applications::ApplicationError),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;
