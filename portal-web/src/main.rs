//! Portal Web Server
//!
//! HTTP API for submitter and reviewer accounts and assignments.

use clap::Parser;
use portal_core::{init_logging, PortalConfig};
use portal_web::server::PortalServerBuilder;
use portal_web::WebConfig;
use std::path::PathBuf;

/// Portal Web Server - authentication and assignment review API
#[derive(Parser)]
#[command(name = "portal-web")]
#[command(about = "HTTP API for the assignment portal")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// SQLite database URL; in-memory stores when unset
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(self, config: &mut PortalConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.dev {
            config.server.dev_mode = true;
        }
        if let Some(database_url) = self.database_url {
            config.storage.database_url = Some(database_url);
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Load environment variables before the config layer reads PORTAL_*
    dotenvy::dotenv().ok();

    let mut config = match PortalConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            eprintln!("Run `portal config --init` or set PORTAL_AUTH__JWT_SECRET.");
            std::process::exit(1);
        }
    };
    args.apply(&mut config);

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let server = match PortalServerBuilder::from(WebConfig::from_portal_config(&config))
        .build()
        .await
    {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        eprintln!("Server failed: {}", e);
        std::process::exit(1);
    }
}
