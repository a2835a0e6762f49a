//! Rtsim CLI - Command-line interface
//!
//! Runs scheduler simulations and renders their snapshots.

mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rtsim_core::tracing_setup::{CliLogLevel, init_tracing};
use tracing::error;

#[derive(Parser)]
#[command(name = "rtsim")]
#[command(about = "Fixed-priority real-time scheduler simulator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Console log level
    #[arg(long, value_enum, default_value_t = CliLogLevel::Warn, global = true)]
    log_level: CliLogLevel,

    /// Write a full trace of the run to this directory
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref())
        .context("initializing logging")?;

    if let Err(err) = commands::handle_command(cli.command).await {
        error!(error = %err, user_error = err.is_user_error(), "command failed");
        eprintln!("Error: {}", err.user_message());
        std::process::exit(commands::exit_code(&err));
    }

    Ok(())
}
