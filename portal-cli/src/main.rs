//! Portal CLI - operator commands for the assignment portal
//!
//! Manages the configuration file and lets an operator register accounts,
//! obtain tokens and inspect tokens without going through HTTP.

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use clap::{Parser, Subcommand};
use portal_applications::{PortalApplication, TokenCodec};
use portal_core::{
    init_logging, log_operation_start, log_operation_success, AuthConfig, LogFormat, LoggingConfig,
    PortalConfig, Role,
};
use rand::{rngs::OsRng, RngCore};
use std::path::{Path, PathBuf};
use tracing::info;

const SECRET_BYTES: usize = 48;
const DEFAULT_TTL_SECS: u64 = 3600;
const REDACTED: &str = "<redacted>";

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Operator tools for the assignment portal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the configuration file
    Config {
        /// Write a configuration template with a fresh signing secret
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long, requires = "init")]
        force: bool,

        /// Show the effective configuration (secret redacted)
        #[arg(long)]
        show: bool,

        /// Validate the effective configuration
        #[arg(long)]
        validate: bool,
    },

    /// Register an identity in the configured database
    Register {
        #[arg(long)]
        login: String,

        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,

        /// submitter or reviewer
        #[arg(long)]
        role: Role,
    },

    /// Log in and print a bearer token
    Login {
        #[arg(long)]
        login: String,

        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Verify a token with the configured key and print its claims
    InspectToken { token: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let mut logging_config = LoggingConfig {
        format: LogFormat::Compact,
        include_location: false,
        ..LoggingConfig::default()
    };
    if cli.verbose {
        logging_config.level = "debug".to_string();
    } else {
        // Keep stdout for command output
        logging_config.level = "warn".to_string();
        logging_config.filter_directives.clear();
    }
    init_logging(&logging_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Config {
            init,
            force,
            show,
            validate,
        } => handle_config(config_path, init, force, show, validate),
        Commands::Register {
            login,
            password,
            role,
        } => handle_register(config_path, &login, &password, role).await,
        Commands::Login { login, password } => handle_login(config_path, &login, &password).await,
        Commands::InspectToken { token } => handle_inspect(config_path, &token),
    }
}

fn handle_config(
    path: Option<&Path>,
    init: bool,
    force: bool,
    show: bool,
    validate: bool,
) -> Result<()> {
    if !(init || show || validate) {
        bail!("Nothing to do: pass --init, --show or --validate");
    }

    if init {
        let target = match path {
            Some(path) => path.to_path_buf(),
            None => PortalConfig::default_path().context("No configuration directory on this platform")?,
        };
        init_config(&target, force)?;
        println!("Configuration written to {}", target.display());
    }

    if show || validate {
        let config = PortalConfig::load(path)?;
        if show {
            println!("{}", redacted_toml(&config)?);
        }
        if validate {
            println!("Configuration is valid");
        }
    }

    Ok(())
}

fn init_config(target: &Path, force: bool) -> Result<()> {
    if target.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite",
            target.display()
        );
    }

    let config = PortalConfig::new(AuthConfig::new(generate_secret(), DEFAULT_TTL_SECS));
    config.save_to_file(target)?;
    Ok(())
}

fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn redacted_toml(config: &PortalConfig) -> Result<String> {
    let mut config = config.clone();
    config.auth.jwt_secret = REDACTED.to_string();
    toml::to_string_pretty(&config).context("Failed to render configuration")
}

/// Register and login only make sense against persistent storage
async fn open_application(path: Option<&Path>) -> Result<PortalApplication> {
    let config = PortalConfig::load(path)?;
    if config.storage.database_url.is_none() {
        bail!("storage.database_url is not set; set it in the config file or PORTAL_STORAGE__DATABASE_URL");
    }

    let application = PortalApplication::builder(config.auth.clone())
        .with_database_url(config.storage.database_url.clone())
        .build()
        .await?;
    Ok(application)
}

async fn handle_register(path: Option<&Path>, login: &str, password: &str, role: Role) -> Result<()> {
    log_operation_start!("cli_register", login = %login, role = %role);
    let application = open_application(path).await?;

    let id = application.auth.register(login, password, role).await?;

    log_operation_success!("cli_register", id = %id);
    println!("Registered {} ({}) with id {}", login, role, id);
    Ok(())
}

async fn handle_login(path: Option<&Path>, login: &str, password: &str) -> Result<()> {
    let application = open_application(path).await?;

    let token = application.auth.login(login, password).await?;
    info!(login = %login, "Token issued");
    println!("{}", token);
    Ok(())
}

fn handle_inspect(path: Option<&Path>, token: &str) -> Result<()> {
    let config = PortalConfig::load(path)?;
    let codec = TokenCodec::from_config(&config.auth)?;

    let claims = codec.parse(token)?;
    println!("{}", serde_json::to_string_pretty(&claims)?);
    if let Some(expires) = chrono::DateTime::from_timestamp(claims.exp, 0) {
        println!("expires at {}", expires.to_rfc3339());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let cli = Cli::parse_from([
            "portal", "register", "--login", "bob", "--password", "pw", "--role", "reviewer",
        ]);
        match cli.command {
            Commands::Register { login, role, .. } => {
                assert_eq!(login, "bob");
                assert_eq!(role, Role::Reviewer);
            }
            _ => panic!("expected register"),
        }

        let cli = Cli::parse_from(["portal", "config", "--init", "--force", "-c", "/tmp/p.toml"]);
        assert!(matches!(cli.command, Commands::Config { init: true, force: true, .. }));
        assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/p.toml")));
    }

    #[test]
    fn test_force_requires_init() {
        assert!(Cli::try_parse_from(["portal", "config", "--force"]).is_err());
        assert!(Cli::try_parse_from(["portal", "register", "--login", "x", "--password", "y", "--role", "admin"]).is_err());
    }

    #[test]
    fn test_generated_secret_is_long_enough() {
        let secret = generate_secret();
        assert!(secret.len() >= portal_core::MIN_SECRET_LEN);
        assert_ne!(secret, generate_secret());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portal").join("config.toml");

        init_config(&path, false).unwrap();
        let first = PortalConfig::from_file(&path).unwrap();
        assert!(init_config(&path, false).is_err());

        init_config(&path, true).unwrap();
        let second = PortalConfig::from_file(&path).unwrap();
        assert_ne!(first.auth.jwt_secret, second.auth.jwt_secret);
        assert_eq!(second.auth.token_ttl_secs, DEFAULT_TTL_SECS);
    }

    #[test]
    fn test_show_redacts_secret() {
        let config = PortalConfig::new(AuthConfig::new("super-secret-signing-key-material!!", 60));
        let rendered = redacted_toml(&config).unwrap();
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains(REDACTED));
    }

    #[tokio::test]
    async fn test_register_then_login_against_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = PortalConfig::new(AuthConfig::new(generate_secret(), 600));
        config.storage.database_url = Some(format!("sqlite://{}", dir.path().join("portal.db").display()));
        config.save_to_file(&path).unwrap();

        handle_register(Some(&path), "carol", "pw", Role::Reviewer).await.unwrap();
        assert!(handle_register(Some(&path), "carol", "pw", Role::Reviewer).await.is_err());

        let application = open_application(Some(&path)).await.unwrap();
        let token = application.auth.login("carol", "pw").await.unwrap();
        let claims = application.codec().parse(&token).unwrap();
        assert_eq!(claims.role, Role::Reviewer);
    }

    #[tokio::test]
    async fn test_commands_need_a_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        PortalConfig::new(AuthConfig::new(generate_secret(), 600))
            .save_to_file(&path)
            .unwrap();

        assert!(open_application(Some(&path)).await.is_err());
    }
}
