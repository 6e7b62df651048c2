use anyhow::Context;
use clap::Parser;
use clearmark::config::Config;
use clearmark::server::{build_server, RunMode};
use std::path::PathBuf;

/// Clearmark - synchronous front for an asynchronous watermark-removal API
#[derive(Parser, Debug)]
#[command(name = "clearmark")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Daemon mode
    #[arg(short = 'd', long)]
    daemon: bool,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_ref())?;

    clearmark::logging::init_subscriber(&config.logging)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    tracing::info!(
        config_file = ?args.config,
        server_address = %config.server.address,
        server_port = config.server.port,
        api_base_url = %config.api.base_url,
        poll_attempts = config.polling.max_attempts,
        poll_interval_ms = config.polling.interval_ms,
        "Configuration loaded successfully"
    );

    let server = build_server(
        &config,
        RunMode {
            daemon: args.daemon,
            test: args.test,
        },
    )?;

    tracing::info!("Starting Clearmark");

    // Blocks until shutdown
    server.run_forever();
}
