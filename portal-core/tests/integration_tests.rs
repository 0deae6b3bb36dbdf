//! Integration tests for portal-core infrastructure

use portal_core::{
    config_error, conflict_error, init_logging, not_found_error, storage_error, validation_error,
    AuthConfig, ErrorContext, LogFormat, LoggingConfig, PortalConfig, PortalError,
};

#[tokio::test]
async fn test_error_handling() {
    let error = storage_error!("Test storage error", "test_component");

    match &error {
        PortalError::Storage {
            message, context, ..
        } => {
            assert_eq!(message, "Test storage error");
            assert_eq!(context.component, "test_component");
            assert!(!context.error_id.is_empty());
        }
        _ => panic!("Expected Storage error"),
    }

    // Should not panic
    error.log();
    assert!(error.is_recoverable());

    let config_error = config_error!("Invalid config", "test");
    assert!(!config_error.is_recoverable());
    assert!(!config_error.context().unwrap().recovery_suggestions.is_empty());

    let conflict = conflict_error!("identity 'alice'", "test");
    assert!(conflict.is_conflict());
    assert!(!conflict.is_recoverable());
}

#[tokio::test]
async fn test_error_macros_carry_fields() {
    let error = validation_error!("task must not be empty", "task", "assignments");
    match error {
        PortalError::Validation { field, context, .. } => {
            assert_eq!(field.as_deref(), Some("task"));
            assert_eq!(context.component, "assignments");
        }
        _ => panic!("Expected Validation error"),
    }

    let error = not_found_error!("assignment 42", "assignments");
    assert_eq!(error.to_string(), "Resource not found: assignment 42");

    let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
    let error = storage_error!("Failed to write", "sqlite", io);
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn test_error_context_builder() {
    let context = ErrorContext::new("auth")
        .with_operation("login")
        .with_metadata("login", "alice")
        .with_suggestion("Retry later");

    assert_eq!(context.operation.as_deref(), Some("login"));
    assert_eq!(context.metadata.get("login").map(String::as_str), Some("alice"));
    assert_eq!(context.recovery_suggestions.len(), 1);
}

#[tokio::test]
async fn test_logging_initialization() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Compact,
        include_location: false,
        include_thread: false,
        include_timestamp: true,
        log_to_file: false,
        log_file_path: None,
        enable_span_timing: false,
        filter_directives: vec!["portal_core=debug".to_string()],
    };

    // Only the first global subscriber wins; a second call must fail instead of panicking.
    let _ = init_logging(&config);
    assert!(init_logging(&config).is_err());
}

#[test]
fn test_load_reads_file_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("portal.toml");
    std::fs::write(
        &path,
        r#"
[auth]
jwt_secret = "0123456789abcdef0123456789abcdef"
token_ttl_secs = 600

[server]
port = 3000
"#,
    )
    .unwrap();

    let config = PortalConfig::load(Some(&path)).unwrap();
    assert_eq!(config.auth.token_ttl_secs, 600);
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "127.0.0.1");
    assert!(config.storage.database_url.is_none());
}

#[test]
fn test_load_rejects_zero_ttl() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("portal.toml");
    std::fs::write(
        &path,
        "[auth]\njwt_secret = \"0123456789abcdef0123456789abcdef\"\ntoken_ttl_secs = 0\n",
    )
    .unwrap();

    assert!(matches!(
        PortalConfig::load(Some(&path)),
        Err(PortalError::Config { .. })
    ));
}

#[test]
fn test_load_requires_existing_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    assert!(PortalConfig::load(Some(&missing)).is_err());
}

#[test]
fn test_auth_config_ttl() {
    let auth = AuthConfig::new("secret", 90);
    assert_eq!(auth.token_ttl().as_secs(), 90);
}
