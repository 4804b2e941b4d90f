//! Broker node — standalone HTTP daemon exposing the coupling broker's
//! session registry over the endpoints in the external interface spec.
//!
//! Usage:
//!   broker-node --config broker.toml

use std::path::PathBuf;

use anyhow::{Context, Result};
use broker_server::{BrokerServer, ServerConfig};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "broker-node", about = "Model-coupling data-exchange broker", version)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short = 'c', default_value = "broker.toml", value_name = "PATH")]
    config: PathBuf,

    /// Overrides the configured bind host.
    #[arg(long, value_name = "HOST")]
    host: Option<String>,

    /// Overrides the configured bind port.
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,

    /// Overrides the housekeeper's snapshot interval, in seconds.
    #[arg(long, value_name = "SECONDS")]
    housekeeper_interval_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = if cli.config.exists() {
        ServerConfig::load(&cli.config)
            .with_context(|| format!("loading config from {}", cli.config.display()))?
    } else {
        ServerConfig::default()
    };

    if let Some(host) = cli.host {
        config.network.host = host;
    }
    if let Some(port) = cli.port {
        config.network.port = port;
    }
    if let Some(secs) = cli.housekeeper_interval_secs {
        config.housekeeper.interval_secs = secs;
    }

    info!(
        host = %config.network.host,
        port = config.network.port,
        housekeeper_interval_secs = config.housekeeper.interval_secs,
        "starting broker node"
    );

    let server = BrokerServer::new(&config).context("binding broker server")?;
    server
        .run(async {
            if let Err(err) = signal::ctrl_c().await {
                tracing::error!(%err, "failed to wait for shutdown signal");
            } else {
                info!("shutdown signal received (Ctrl+C)");
            }
        })
        .await;

    info!("broker node shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
