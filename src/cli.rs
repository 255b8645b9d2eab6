// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every flag here is optional; values left unset fall back to the config
//! file (if any) and then to the built-in defaults.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `testwatch`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "testwatch",
    version,
    about = "Watch a Go source tree and re-run `go test` when files change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Testwatch.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory to watch (default: current directory).
    #[arg(short = 'r', long = "root", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Debounce delay before running tests after changes (e.g. "500ms", "1s").
    #[arg(short = 'd', long = "delay", value_name = "DURATION")]
    pub delay: Option<String>,

    /// File filter pattern matched against file names (e.g. "*.go", "*_test.go").
    #[arg(short = 'f', long = "filter", value_name = "GLOB")]
    pub filter: Option<String>,

    /// Enable test coverage reporting.
    #[arg(short = 'c', long = "coverage")]
    pub coverage: bool,

    /// Use the polling watcher instead of OS change notifications.
    #[arg(long = "poll")]
    pub poll: bool,

    /// Interval between polling scans (only used by the polling watcher).
    #[arg(long, value_name = "DURATION")]
    pub poll_interval: Option<String>,

    /// Redraw status output in place instead of appending lines.
    #[arg(long)]
    pub live: bool,

    /// Do not ring the terminal bell on failures.
    #[arg(long)]
    pub no_bell: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TESTWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the effective configuration and watched directories, then exit.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The level as an `EnvFilter` directive.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
