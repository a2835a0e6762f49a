//! CLI command implementations

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Subcommand, ValueEnum};
use rtsim_core::{Result, RtsimError, Simulation, SimulationConfig};
use tracing::info;

use crate::render::{JsonRenderer, TextRenderer};

/// Snapshot output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Console view with task bars and timeline
    Text,
    /// One JSON object per line
    Json,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a simulation
    Run {
        /// JSON configuration file (reference task set if omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the tick horizon
        #[arg(long)]
        horizon: Option<u64>,
        /// Snapshot output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Pause between ticks in milliseconds
        #[arg(long, default_value = "0")]
        delay_ms: u64,
        /// Clear the terminal before each tick
        #[arg(long)]
        clear: bool,
        /// Print only the final summary
        #[arg(long)]
        summary_only: bool,
    },
    /// Validate a configuration file and show its task table
    Validate {
        /// JSON configuration file
        config: PathBuf,
    },
    /// Print the reference configuration as JSON
    ExampleConfig,
}

/// Process exit code for a failed command: 2 for bad input, 1 otherwise.
pub fn exit_code(err: &RtsimError) -> i32 {
    if err.is_user_error() { 2 } else { 1 }
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            config,
            horizon,
            format,
            delay_ms,
            clear,
            summary_only,
        } => {
            let options = RunOptions {
                format,
                delay: Duration::from_millis(delay_ms),
                clear,
                summary_only,
            };
            run_simulation(config.as_deref(), horizon, options).await
        }
        Commands::Validate { config } => validate_config(&config),
        Commands::ExampleConfig => print_example_config(),
    }
}

/// Presentation settings for a run.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub format: OutputFormat,
    pub delay: Duration,
    pub clear: bool,
    pub summary_only: bool,
}

/// Loads a configuration file, or the reference set, with env overrides.
///
/// # Errors
/// - `RtsimError::Config` - File missing or malformed
pub fn load_config(path: Option<&Path>, horizon: Option<u64>) -> Result<SimulationConfig> {
    let config = match path {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            SimulationConfig::from_file(path)?
        }
        None => SimulationConfig::reference(),
    };

    let mut config = config.with_env_overrides();
    if let Some(ticks) = horizon {
        config.horizon = ticks;
    }
    Ok(config)
}

/// Run a simulation and print snapshots plus the final summary
///
/// # Errors
/// - `RtsimError::Config` - Configuration could not be loaded
/// - `RtsimError::Simulation` - Configuration invalid or scheduler invariant violated
/// - `RtsimError::Io` - Writing to stdout failed
pub async fn run_simulation(
    path: Option<&Path>,
    horizon: Option<u64>,
    options: RunOptions,
) -> Result<()> {
    let config = load_config(path, horizon)?;
    let mut sim = Simulation::new(config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut text = TextRenderer::new(options.clear);

    while !sim.is_finished() {
        let snapshot = sim.step()?;

        if !options.summary_only {
            match options.format {
                OutputFormat::Text => text.render(&mut out, &snapshot)?,
                OutputFormat::Json => JsonRenderer::render(&mut out, &snapshot)?,
            }
            out.flush()?;
        }

        if !options.delay.is_zero() && !sim.is_finished() {
            tokio::time::sleep(options.delay).await;
        }
    }

    let report = sim.report();
    match options.format {
        OutputFormat::Text => text.render_summary(&mut out, &report)?,
        OutputFormat::Json => JsonRenderer::render_report(&mut out, &report)?,
    }
    out.flush()?;

    Ok(())
}

/// Validate a configuration and print its task table
///
/// # Errors
/// - `RtsimError::Config` - File missing, malformed or semantically invalid
pub fn validate_config(path: &Path) -> Result<()> {
    let config = SimulationConfig::from_file(path)?;
    config.validate()?;

    println!("Configuration OK: {}", path.display());
    println!("  Horizon: {} ticks", config.horizon);
    println!("  Display window: {} ticks", config.display_window);
    println!("  Tasks:");
    for (index, spec) in config.tasks.iter().enumerate() {
        println!(
            "    T{index}: priority {}, period {}, execution {}, resource {}",
            spec.priority,
            spec.period,
            spec.execution_time,
            if spec.needs_resource { "yes" } else { "no" }
        );
    }
    println!("  Utilization: {:.3}", config.total_utilization());

    Ok(())
}

/// Print the reference configuration
///
/// # Errors
/// - `RtsimError::Config` - Serialization failed
pub fn print_example_config() -> Result<()> {
    println!("{}", SimulationConfig::reference().to_json_pretty()?);
    Ok(())
}
