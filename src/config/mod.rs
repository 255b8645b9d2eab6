// src/config/mod.rs

//! Configuration loading and validation for testwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and merge CLI overrides (`loader.rs`).
//! - Validate values and produce the effective `ConfigFile` (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_effective, load_from_path, DEFAULT_CONFIG_FILE};
pub use model::{
    parse_duration, ConfigFile, OutputSection, RawConfigFile, TestSection, WatchSection,
};
