// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod report;
pub mod source;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_effective, ConfigFile};
use crate::engine::{stop_channel, stop_on_signals, Runtime, SessionSettings};
use crate::exec::GoTestRunner;
use crate::fs::{FileSystem, RealFileSystem};
use crate::report::{LiveSink, PlainSink, ReportSink};
use crate::source::NotificationSource;
use crate::watch::{discover_directories, WatchRegistry};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - the notification source (event-driven, or polling as a fallback)
/// - the one-time directory registration
/// - the test runner and presentation sink
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_effective(&args)?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    if args.dry_run {
        print_dry_run(&cfg, fs.as_ref())?;
        return Ok(());
    }

    let settings = SessionSettings::from_config(&cfg)?;

    let mut source = if cfg.force_polling() {
        NotificationSource::polling(Arc::clone(&fs), cfg.poll_interval())
    } else {
        NotificationSource::new(Arc::clone(&fs), cfg.poll_interval())
    }
    .context("error creating file watcher")?;

    let registry = WatchRegistry::seed(fs.as_ref(), cfg.root(), &mut source)
        .context("error setting up directory watch")?;
    debug!(directories = registry.len(), "watch registry seeded");

    let mut sink: Box<dyn ReportSink> = if cfg.live() {
        Box::new(LiveSink::stdout())
    } else {
        Box::new(PlainSink::stdout())
    };
    sink.write_line("Watching for file changes. Press Ctrl+C to exit.");
    if cfg.coverage() {
        sink.write_line("Test coverage reporting enabled");
    }
    sink.flush();

    // SIGINT / SIGTERM → graceful shutdown.
    let (stop, signal) = stop_channel();
    stop_on_signals(stop).context("error installing signal handlers")?;

    let runner = GoTestRunner::new(cfg.command(), cfg.root());
    info!(root = ?cfg.root(), command = cfg.command(), "starting watch session");

    let runtime = Runtime::new(settings, source, runner, sink, signal, fs);
    runtime.run().await?;
    Ok(())
}

/// Print the effective configuration and what would be watched.
fn print_dry_run(cfg: &ConfigFile, fs: &dyn FileSystem) -> Result<()> {
    println!("testwatch dry-run");
    println!("  root = {}", cfg.root().display());
    println!("  debounce = {:?}", cfg.debounce());
    println!("  filter = {}", cfg.filter());
    println!("  command = {}", cfg.command());
    println!("  coverage = {}", cfg.coverage());
    println!("  focus_test_file = {}", cfg.focus_test_file());
    println!("  live = {}", cfg.live());
    println!("  bell = {}", cfg.bell());
    println!();

    if cfg.force_polling() {
        println!("strategy: polling every {:?}", cfg.poll_interval());
    } else {
        println!(
            "strategy: OS notifications (polling every {:?} if unavailable)",
            cfg.poll_interval()
        );
    }
    println!();

    let dirs = discover_directories(fs, cfg.root())?;
    println!("directories ({}):", dirs.len());
    for dir in &dirs {
        println!("  - {}", dir.display());
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
