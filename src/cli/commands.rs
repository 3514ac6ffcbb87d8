//! CLI command implementations
//!
//! Configuration is resolved once per command: defaults, then the optional
//! JSON file, then the environment, then command-line flags.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::info;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;
use crate::config::DashboardConfig;
use crate::db::{Connector, MySqlConnector, Session};
use crate::http_server::HttpServer;

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, host, port } => serve(config.as_deref(), host, port),
        Command::Check { config } => check(config.as_deref()),
    }
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::io_error(format!("Failed to create tokio runtime: {}", e)))
}

/// Serve the dashboard until the process is stopped
pub fn serve(config_path: Option<&Path>, host: Option<String>, port: Option<u16>) -> CliResult<()> {
    let mut config = DashboardConfig::load(config_path)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let connector = MySqlConnector::from_config(&config);
    info!(db = %connector.describe(), "using database");
    let server = HttpServer::with_config(config.server.clone(), Arc::new(connector), &config.secret_key);

    runtime()?.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Verify the configured database is reachable
pub fn check(config_path: Option<&Path>) -> CliResult<()> {
    let config = DashboardConfig::load(config_path)?;
    let connector = MySqlConnector::from_config(&config);

    runtime()?.block_on(async {
        let mut session = connector.connect().await?;
        let result = session.fetch_all("SELECT 1 AS ok", &[]).await;
        let closed = session.close().await;
        result?;
        closed?;
        Ok::<_, CliError>(())
    })?;

    write_response(json!({
        "database": connector.describe(),
        "reachable": true,
    }))
}
