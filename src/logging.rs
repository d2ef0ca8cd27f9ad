//! # Logging Module
//!
//! Installs the global `tracing` subscriber.
//!
//! The terminal belongs to the teleop screen, so logs go to a daily rolling
//! file under the configured directory. `RUST_LOG` overrides the configured
//! level.

use std::fs;
use std::str::FromStr;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{FakeJoyError, Result};

/// Parse a configured level name
pub fn parse_level(level: &str) -> Result<Level> {
    Level::from_str(level).map_err(|e| FakeJoyError::Logging(format!("{}: '{}'", e, level)))
}

/// Install the file subscriber
///
/// Keep the returned guard alive until exit; dropping it flushes buffered
/// lines.
///
/// # Errors
///
/// Returns error if the directory cannot be created, the level is invalid
/// or a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
    let level = parse_level(&config.level)?;
    fs::create_dir_all(&config.dir)?;

    let appender = tracing_appender::rolling::daily(&config.dir, &config.file_prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| FakeJoyError::Logging(e.to_string()))?;

    Ok(guard)
}
