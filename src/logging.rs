// src/logging.rs

//! Diagnostics for `testwatch` via `tracing`.
//!
//! Filter selection:
//! 1. `--log-level` applies one level to everything.
//! 2. Otherwise `TESTWATCH_LOG` is read as an `EnvFilter` directive string,
//!    so both `debug` and `testwatch::engine=trace,info` work.
//! 3. Otherwise `info`.
//!
//! Diagnostics go to stderr. Stdout belongs to the report sink.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "TESTWATCH_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(level.as_directive()),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
