// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// root = "."
/// debounce = "500ms"
/// filter = "*.go"
/// poll_interval = "200ms"
/// force_polling = false
///
/// [test]
/// command = "go"
/// coverage = false
/// focus_test_file = true
///
/// [output]
/// live = false
/// bell = true
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub test: TestSection,

    #[serde(default)]
    pub output: OutputSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Directory to watch. Relative paths are resolved against the config
    /// file's directory; `None` means the current working directory.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Quiet period after the last change before tests run.
    #[serde(default = "default_debounce")]
    pub debounce: String,

    /// Glob matched against the changed file's name.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Tick interval of the polling watcher.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    /// Skip OS change notifications and always poll.
    #[serde(default)]
    pub force_polling: bool,
}

fn default_debounce() -> String {
    "500ms".to_string()
}

fn default_filter() -> String {
    "*.go".to_string()
}

fn default_poll_interval() -> String {
    "200ms".to_string()
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            root: None,
            debounce: default_debounce(),
            filter: default_filter(),
            poll_interval: default_poll_interval(),
            force_polling: false,
        }
    }
}

/// `[test]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TestSection {
    /// Executable invoked as `<command> test -v ...`.
    #[serde(default = "default_command")]
    pub command: String,

    #[serde(default)]
    pub coverage: bool,

    /// Narrow a run to the tests declared in a single changed `_test.go` file.
    #[serde(default = "default_true")]
    pub focus_test_file: bool,
}

fn default_command() -> String {
    "go".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for TestSection {
    fn default() -> Self {
        Self {
            command: default_command(),
            coverage: false,
            focus_test_file: true,
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
    #[serde(default)]
    pub live: bool,

    #[serde(default = "default_true")]
    pub bell: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            live: false,
            bell: true,
        }
    }
}

/// Validated, effective configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`),
/// so every value here has already been checked.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    root: PathBuf,
    debounce: Duration,
    filter: String,
    poll_interval: Duration,
    force_polling: bool,
    command: String,
    coverage: bool,
    focus_test_file: bool,
    live: bool,
    bell: bool,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        root: PathBuf,
        debounce: Duration,
        filter: String,
        poll_interval: Duration,
        raw: &RawConfigFile,
    ) -> Self {
        Self {
            root,
            debounce,
            filter,
            poll_interval,
            force_polling: raw.watch.force_polling,
            command: raw.test.command.trim().to_string(),
            coverage: raw.test.coverage,
            focus_test_file: raw.test.focus_test_file,
            live: raw.output.live,
            bell: raw.output.bell,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn force_polling(&self) -> bool {
        self.force_polling
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn coverage(&self) -> bool {
        self.coverage
    }

    pub fn focus_test_file(&self) -> bool {
        self.focus_test_file
    }

    pub fn live(&self) -> bool {
        self.live
    }

    pub fn bell(&self) -> bool {
        self.bell
    }
}

/// Parse a duration string such as `"500ms"`, `"2s"`, `"1m"` or `"1h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}
