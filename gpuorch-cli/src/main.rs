//! GPU Orchestrator CLI
//!
//! Command-line interface for submitting and tracking jobs on the GPU
//! orchestration service.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use gpuorch_client::DEFAULT_API_URL;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gpuorch")]
#[command(about = "GPU Orchestration Platform CLI", long_about = None)]
struct Cli {
    /// Orchestration service URL
    #[arg(long, env = "GPUORCH_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr so they never mix with command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::new(cli.api_url);
    tracing::debug!(api_url = %config.api_url, "using orchestration service");

    handle_command(cli.command, &config).await
}
