//! Portal Core - shared data structures, collaborator traits and infrastructure
//!
//! Defines the identity and assignment types, the storage traits consumed by the
//! authentication core, and the error, configuration and logging plumbing used by
//! every other crate in the workspace.

pub mod config;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio;
pub use tracing;
