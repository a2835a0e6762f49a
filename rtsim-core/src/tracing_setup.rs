//! Tracing setup for rtsim
//!
//! Console logs follow the user's chosen level. When a log directory is
//! supplied, a second layer records every event of the run to disk so a
//! schedule can be replayed tick by tick after the fact.

use std::fs::{File, create_dir_all};
use std::path::Path;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Name of the per-run debug log written inside the logs directory.
pub const LOG_FILE_NAME: &str = "rtsim-last-run.log";

/// Initialize tracing with console output and an optional trace-level file.
///
/// Console output goes to stderr so rendered snapshots on stdout stay
/// machine readable. `RUST_LOG` overrides `console_level` when set.
///
/// # Errors
///
/// - `std::io::Error` - If the logs directory cannot be created or the log
///   file cannot be opened for writing
pub fn init_tracing(console_level: Level, logs_dir: Option<&Path>) -> Result<(), std::io::Error> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level.to_string()));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let file_layer = match logs_dir {
        Some(dir) => {
            create_dir_all(dir)?;
            let log_file = File::create(dir.join(LOG_FILE_NAME))?;

            Some(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .with_writer(log_file)
                    .with_filter(EnvFilter::new("trace")),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    match logs_dir {
        Some(dir) => tracing::info!(
            "Tracing initialized: console={}, debug_file={}",
            console_level,
            dir.join(LOG_FILE_NAME).display()
        ),
        None => tracing::info!("Tracing initialized: console={}", console_level),
    }

    Ok(())
}

/// CLI log levels for user control
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliLogLevel {
    /// Only error messages
    Error,
    /// Warning and error messages
    Warn,
    /// Informational, warning, and error messages
    Info,
    /// Per-tick scheduling decisions
    Debug,
    /// Everything, including settled state per tick
    Trace,
}

impl CliLogLevel {
    /// Converts CLI log level to tracing Level enum.
    ///
    /// # Examples
    /// ```
    /// use rtsim_core::tracing_setup::CliLogLevel;
    ///
    /// let level = CliLogLevel::Info.as_tracing_level();
    /// assert_eq!(level, tracing::Level::INFO);
    /// ```
    pub fn as_tracing_level(self) -> Level {
        match self {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::str::FromStr for CliLogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(CliLogLevel::Error),
            "warn" => Ok(CliLogLevel::Warn),
            "info" => Ok(CliLogLevel::Info),
            "debug" => Ok(CliLogLevel::Debug),
            "trace" => Ok(CliLogLevel::Trace),
            _ => Err(format!("Invalid log level: {s}")),
        }
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliLogLevel::Error => write!(f, "error"),
            CliLogLevel::Warn => write!(f, "warn"),
            CliLogLevel::Info => write!(f, "info"),
            CliLogLevel::Debug => write!(f, "debug"),
            CliLogLevel::Trace => write!(f, "trace"),
        }
    }
}
