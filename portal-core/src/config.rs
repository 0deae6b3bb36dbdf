//! Configuration management
//!
//! Layered loading: an optional TOML file, then `PORTAL_*` environment variables
//! (`PORTAL_AUTH__JWT_SECRET`, `PORTAL_SERVER__PORT`, ...). The `auth` section has no
//! defaults; a process without a signing secret and TTL must not start.

use crate::error::{ErrorContext, PortalError, PortalResult};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "PORTAL";

/// Recommended minimum HMAC secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Token signing configuration, loaded once at startup
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Symmetric HMAC signing secret
    pub jwt_secret: String,
    /// Lifetime of issued tokens in seconds
    pub token_ttl_secs: u64,
}

// Hand-written so the secret never reaches a log line.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, token_ttl_secs: u64) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl_secs,
        }
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn validate(&self) -> PortalResult<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(PortalError::Config {
                message: "auth.jwt_secret is required and must not be empty".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set PORTAL_AUTH__JWT_SECRET or auth.jwt_secret in the config file"),
            });
        }

        if self.token_ttl_secs == 0 {
            return Err(PortalError::Config {
                message: "auth.token_ttl_secs must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set auth.token_ttl_secs to a positive number of seconds"),
            });
        }

        if self.jwt_secret.len() < MIN_SECRET_LEN {
            tracing::warn!(
                length = self.jwt_secret.len(),
                recommended = MIN_SECRET_LEN,
                "JWT secret is shorter than recommended"
            );
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub dev_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
        }
    }
}

/// Where identities and assignments live. No database URL means in-memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_url: Option<String>,
}

impl PortalConfig {
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            auth,
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// `<config_dir>/portal/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("portal").join("config.toml"))
    }

    /// Load from `path` (or the default location, if present) overlaid with `PORTAL_*`
    /// environment variables, then validate.
    pub fn load(path: Option<&Path>) -> PortalResult<Self> {
        let mut builder = config::Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(default) = Self::default_path() {
                    builder = builder.add_source(config::File::from(default).required(false));
                }
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build().map_err(|e| PortalError::Config {
            message: format!("Failed to load configuration: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("load")
                .with_suggestion("Check TOML syntax and PORTAL_* environment variables"),
        })?;

        let config: PortalConfig = settings.try_deserialize().map_err(|e| PortalError::Config {
            message: format!("Invalid configuration: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("deserialize")
                .with_suggestion("auth.jwt_secret and auth.token_ttl_secs are required"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file without environment overlay
    pub fn from_file<P: AsRef<Path>>(path: P) -> PortalResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PortalError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: PortalConfig = toml::from_str(&content).map_err(|e| PortalError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> PortalResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| PortalError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content).map_err(|e| PortalError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> PortalResult<()> {
        self.auth.validate()?;

        if self.server.host.trim().is_empty() {
            return Err(PortalError::Config {
                message: "server.host must not be empty".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set server.host, e.g. 127.0.0.1"),
            });
        }

        if let Some(url) = &self.storage.database_url {
            if !url.starts_with("sqlite:") {
                return Err(PortalError::Config {
                    message: format!("Unsupported database URL: {}", url),
                    source: None,
                    context: ErrorContext::new("config")
                        .with_operation("validate")
                        .with_suggestion("Use a sqlite: URL, e.g. sqlite://portal.db"),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_is_rejected() {
        let config = PortalConfig::new(AuthConfig::new("   ", 3600));
        assert!(matches!(config.validate(), Err(PortalError::Config { .. })));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let config = PortalConfig::new(AuthConfig::new("a".repeat(48), 0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_output_redacts_secret() {
        let auth = AuthConfig::new("super-secret-value", 60);
        let rendered = format!("{:?}", auth);
        assert!(!rendered.contains("super-secret-value"));
        assert!(rendered.contains("token_ttl_secs: 60"));
    }

    #[test]
    fn save_and_reload_preserves_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = PortalConfig::new(AuthConfig::new("k".repeat(40), 900));
        config.server.port = 9090;
        config.storage.database_url = Some("sqlite://portal.db".to_string());
        config.save_to_file(&path).unwrap();

        let loaded = PortalConfig::from_file(&path).unwrap();
        assert_eq!(loaded.auth.token_ttl_secs, 900);
        assert_eq!(loaded.server.port, 9090);
        assert_eq!(loaded.storage.database_url.as_deref(), Some("sqlite://portal.db"));
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn file_without_auth_section_fails_to_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 8081\n").unwrap();

        assert!(PortalConfig::from_file(&path).is_err());
    }
}
