//! Unified error handling system
//!
//! Structured error types with context, recovery suggestions, and error chaining.
//! Authentication failures have their own taxonomy in `portal-applications`;
//! this type covers infrastructure: storage, configuration, validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};

pub type PortalResult<T> = Result<T, PortalError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Key/value details such as the offending login or table
    pub metadata: HashMap<String, String>,
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the portal infrastructure
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    /// A uniqueness constraint was violated (e.g. a login registered twice)
    #[error("Resource already exists: {resource}")]
    Conflict {
        resource: String,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

}

impl PortalError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            PortalError::Storage { context, .. } => Some(context),
            PortalError::Config { context, .. } => Some(context),
            PortalError::Validation { context, .. } => Some(context),
            PortalError::NotFound { context, .. } => Some(context),
            PortalError::Conflict { context, .. } => Some(context),
            PortalError::Io(_) => None,
        }
    }

    /// Storage and IO failures may succeed on a later attempt; nothing else will.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PortalError::Storage { .. } | PortalError::Io(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, PortalError::Conflict { .. })
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let error_id = self.context().map(|c| c.error_id.as_str());
        match self {
            PortalError::Storage { .. } => {
                error!(error_id = ?error_id, error = %self, "Storage failure");
            }
            PortalError::Config { .. } => {
                error!(error_id = ?error_id, error = %self, "Configuration error");
            }
            PortalError::Validation { .. }
            | PortalError::NotFound { .. }
            | PortalError::Conflict { .. } => {
                warn!(error_id = ?error_id, error = %self, "Request could not be completed");
            }
            PortalError::Io(_) => {
                error!(error = %self, "I/O failure");
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! storage_error {
    ($msg:expr, $component:expr) => {
        $crate::PortalError::Storage {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::PortalError::Storage {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check that the database is reachable and writable"),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::PortalError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file and PORTAL_* environment variables")
                .with_suggestion("Run 'portal config --init' to create a config with a fresh secret"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::PortalError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        $crate::PortalError::NotFound {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! conflict_error {
    ($resource:expr, $component:expr) => {
        $crate::PortalError::Conflict {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component),
        }
    };
}
