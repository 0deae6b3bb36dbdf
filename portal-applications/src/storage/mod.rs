//! Storage backends for identities and assignments
//!
//! The in-memory stores are always available; the SQLite stores are behind the
//! `sqlite` feature (on by default).

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::{MemoryAssignmentStore, MemoryCredentialStore};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteAssignmentStore, SqliteCredentialStore, SqliteStorage};
