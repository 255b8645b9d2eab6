// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use globset::Glob;

use crate::config::model::{parse_duration, ConfigFile, RawConfigFile};
use crate::errors::{Result, TestwatchError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TestwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let root = validate_root(&raw)?;
        let debounce = positive_duration("[watch].debounce", &raw.watch.debounce)?;
        let poll_interval = positive_duration("[watch].poll_interval", &raw.watch.poll_interval)?;
        validate_filter(&raw.watch.filter)?;
        validate_command(&raw.test.command)?;

        Ok(ConfigFile::new_unchecked(
            root,
            debounce,
            raw.watch.filter.clone(),
            poll_interval,
            &raw,
        ))
    }
}

fn validate_root(cfg: &RawConfigFile) -> Result<PathBuf> {
    let root = match &cfg.watch.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().map_err(|e| {
            TestwatchError::ConfigError(format!("failed to get current directory: {e}"))
        })?,
    };

    if !root.is_dir() {
        return Err(TestwatchError::ConfigError(format!(
            "watch root {:?} does not exist or is not a directory",
            root
        )));
    }

    // Canonical root so event paths and relative scope paths line up.
    Ok(root.canonicalize()?)
}

fn positive_duration(key: &str, value: &str) -> Result<Duration> {
    let duration = parse_duration(value)
        .map_err(|e| TestwatchError::ConfigError(format!("{key}: {e}")))?;
    if duration.is_zero() {
        return Err(TestwatchError::ConfigError(format!(
            "{key} must be greater than zero (got {value:?})"
        )));
    }
    Ok(duration)
}

fn validate_filter(filter: &str) -> Result<()> {
    if filter.trim().is_empty() {
        return Err(TestwatchError::ConfigError(
            "[watch].filter must not be empty".to_string(),
        ));
    }
    Glob::new(filter).map_err(|e| {
        TestwatchError::ConfigError(format!("[watch].filter {filter:?} is not a valid glob: {e}"))
    })?;
    Ok(())
}

fn validate_command(command: &str) -> Result<()> {
    if command.trim().is_empty() {
        return Err(TestwatchError::ConfigError(
            "[test].command must not be empty".to_string(),
        ));
    }
    Ok(())
}
