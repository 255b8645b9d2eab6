// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TestwatchError};

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "Testwatch.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** validate values.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Build the effective configuration for a session.
///
/// - Reads `--config` if given (a missing file is an error), otherwise
///   `Testwatch.toml` in the working directory if it exists.
/// - Applies CLI overrides on top of the file values.
/// - Resolves the watch root: a CLI root is relative to the working
///   directory, a file root to the config file's directory.
/// - Validates everything into a `ConfigFile`.
pub fn load_effective(args: &CliArgs) -> Result<ConfigFile> {
    let cwd = std::env::current_dir().map_err(|e| {
        TestwatchError::ConfigError(format!("failed to get current directory: {e}"))
    })?;

    let (mut raw, base_dir) = match &args.config {
        Some(path) => {
            let path = cwd.join(path);
            debug!(?path, "loading config file");
            (load_from_path(&path)?, config_dir(&path, &cwd))
        }
        None => {
            let path = cwd.join(DEFAULT_CONFIG_FILE);
            if path.is_file() {
                debug!(?path, "loading default config file");
                (load_from_path(&path)?, cwd.clone())
            } else {
                (RawConfigFile::default(), cwd.clone())
            }
        }
    };

    let root = match (&args.root, &raw.watch.root) {
        (Some(cli_root), _) => cwd.join(cli_root),
        (None, Some(file_root)) => base_dir.join(file_root),
        (None, None) => cwd.clone(),
    };
    raw.watch.root = Some(root);

    apply_cli_overrides(&mut raw, args);

    ConfigFile::try_from(raw)
}

/// Overlay explicitly given CLI flags onto file values.
fn apply_cli_overrides(raw: &mut RawConfigFile, args: &CliArgs) {
    if let Some(delay) = &args.delay {
        raw.watch.debounce = delay.clone();
    }
    if let Some(filter) = &args.filter {
        raw.watch.filter = filter.clone();
    }
    if let Some(interval) = &args.poll_interval {
        raw.watch.poll_interval = interval.clone();
    }
    if args.poll {
        raw.watch.force_polling = true;
    }
    if args.coverage {
        raw.test.coverage = true;
    }
    if args.live {
        raw.output.live = true;
    }
    if args.no_bell {
        raw.output.bell = false;
    }
}

fn config_dir(config_path: &Path, cwd: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => cwd.to_path_buf(),
    }
}
