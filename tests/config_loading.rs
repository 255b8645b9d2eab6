// tests/config_loading.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::fs;
use std::time::Duration;

use clap::Parser;

use testwatch::cli::CliArgs;
use testwatch::config::{load_effective, load_from_path, parse_duration, ConfigFile};
use testwatch::errors::TestwatchError;
use testwatch_test_utils::builders::ConfigFileBuilder;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn full_config_file_is_parsed() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Testwatch.toml");
    fs::write(
        &path,
        r#"
[watch]
root = "src"
debounce = "1s"
filter = "*_test.go"
poll_interval = "50ms"
force_polling = true

[test]
command = "gotest"
coverage = true
focus_test_file = false

[output]
live = true
bell = false
"#,
    )?;

    let raw = load_from_path(&path)?;

    assert_eq!(raw.watch.root.as_deref(), Some(std::path::Path::new("src")));
    assert_eq!(raw.watch.debounce, "1s");
    assert_eq!(raw.watch.filter, "*_test.go");
    assert!(raw.watch.force_polling);
    assert_eq!(raw.test.command, "gotest");
    assert!(raw.test.coverage);
    assert!(!raw.test.focus_test_file);
    assert!(raw.output.live);
    assert!(!raw.output.bell);
    Ok(())
}

#[test]
fn empty_config_file_uses_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cfg = ConfigFileBuilder::new(dir.path()).build();

    assert_eq!(cfg.root(), dir.path().canonicalize()?);
    assert_eq!(cfg.debounce(), Duration::from_millis(500));
    assert_eq!(cfg.poll_interval(), Duration::from_millis(200));
    assert_eq!(cfg.filter(), "*.go");
    assert_eq!(cfg.command(), "go");
    assert!(!cfg.force_polling());
    assert!(!cfg.coverage());
    assert!(cfg.focus_test_file());
    assert!(!cfg.live());
    assert!(cfg.bell());
    Ok(())
}

#[test]
fn file_root_is_relative_to_the_config_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::create_dir_all(dir.path().join("service"))?;
    let path = dir.path().join("watch.toml");
    fs::write(&path, "[watch]\nroot = \"service\"\ndebounce = \"250ms\"\n")?;

    let args = CliArgs {
        config: Some(path),
        ..CliArgs::default()
    };
    let cfg = load_effective(&args)?;

    assert_eq!(cfg.root(), dir.path().join("service").canonicalize()?);
    assert_eq!(cfg.debounce(), Duration::from_millis(250));
    Ok(())
}

#[test]
fn cli_flags_override_file_values() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("watch.toml");
    fs::write(
        &path,
        "[watch]\ndebounce = \"2s\"\nfilter = \"*.go\"\n[output]\nbell = true\n",
    )?;

    let args = CliArgs::try_parse_from([
        "testwatch",
        "--config",
        path.to_str().ok_or("non-utf8 temp path")?,
        "--root",
        dir.path().to_str().ok_or("non-utf8 temp path")?,
        "-d",
        "100ms",
        "-f",
        "*_test.go",
        "-c",
        "--poll",
        "--poll-interval",
        "25ms",
        "--live",
        "--no-bell",
    ])?;
    let cfg = load_effective(&args)?;

    assert_eq!(cfg.root(), dir.path().canonicalize()?);
    assert_eq!(cfg.debounce(), Duration::from_millis(100));
    assert_eq!(cfg.filter(), "*_test.go");
    assert_eq!(cfg.poll_interval(), Duration::from_millis(25));
    assert!(cfg.force_polling());
    assert!(cfg.coverage());
    assert!(cfg.live());
    assert!(!cfg.bell());
    Ok(())
}

#[test]
fn missing_explicit_config_file_is_an_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let args = CliArgs {
        config: Some(dir.path().join("absent.toml")),
        ..CliArgs::default()
    };

    assert!(load_effective(&args).is_err());
    Ok(())
}

#[test]
fn invalid_values_are_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;

    let cases = [
        ConfigFileBuilder::new(dir.path()).debounce("0ms").raw(),
        ConfigFileBuilder::new(dir.path()).debounce("fast").raw(),
        ConfigFileBuilder::new(dir.path()).poll_interval("0s").raw(),
        ConfigFileBuilder::new(dir.path()).filter("a{b").raw(),
        ConfigFileBuilder::new(dir.path()).filter("  ").raw(),
        ConfigFileBuilder::new(dir.path()).command("").raw(),
        ConfigFileBuilder::new(dir.path().join("missing")).raw(),
    ];

    for raw in cases {
        let result = ConfigFile::try_from(raw.clone());
        assert!(
            matches!(result, Err(TestwatchError::ConfigError(_))),
            "accepted {raw:?}"
        );
    }
    Ok(())
}

#[test]
fn malformed_toml_is_a_toml_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[watch\ndebounce = ")?;

    assert!(matches!(
        load_from_path(&path),
        Err(TestwatchError::TomlError(_))
    ));
    Ok(())
}

#[test]
fn durations() {
    assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
    assert_eq!(parse_duration("2s"), Ok(Duration::from_secs(2)));
    assert_eq!(parse_duration("1m"), Ok(Duration::from_secs(60)));
    assert_eq!(parse_duration(" 1h "), Ok(Duration::from_secs(3600)));
    assert!(parse_duration("").is_err());
    assert!(parse_duration("10").is_err());
    assert!(parse_duration("5d").is_err());
}
