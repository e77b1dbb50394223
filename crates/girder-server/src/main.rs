//! Girder server binary.

use anyhow::Result;
use clap::Parser;
use girder_server::config::ServerConfig;
use girder_server::server::start_server;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// REST API server for the girder project/ticket tracker.
#[derive(Debug, Parser)]
#[command(name = "girder-server", version, about)]
struct Cli {
    /// Path to a YAML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Override the JSONL data file path.
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Enable permissive CORS for local frontend development.
    #[arg(long)]
    dev_cors: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=girder=debug,girder_server=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("girder=info,girder_server=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path).await?,
        None => ServerConfig::default(),
    };
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(data_file) = cli.data_file {
        config.data_file = data_file;
    }
    if cli.dev_cors {
        config.dev_cors = true;
    }

    if config.accounts.is_empty() {
        tracing::warn!("no accounts configured; every tracker route will answer 401");
    }

    start_server(config).await
}
