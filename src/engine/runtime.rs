// src/engine/runtime.rs

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::errors::{Result, TestwatchError};
use crate::exec::{focused_run_filter, TestInvocation, TestRunner};
use crate::fs::FileSystem;
use crate::report::format::{run_announcement, verdict_lines};
use crate::report::{classify, Outcome, ReportSink, RunVerdict};
use crate::source::NotificationSource;
use crate::types::{ChangeEvent, FailedTestSet};
use crate::watch::FileFilter;

use super::aggregator::{ChangeAggregator, ChangeBatch, DEFAULT_DEBOUNCE};
use super::scope::ScopeResolver;
use super::stop::StopSignal;

/// Per-session knobs the loop needs, independent of where they came from.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub root: PathBuf,
    pub debounce: Duration,
    pub filter: FileFilter,
    pub coverage: bool,
    pub focus_test_file: bool,
    /// Run everything once before waiting for changes.
    pub run_on_start: bool,
    pub bell: bool,
}

impl SessionSettings {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            debounce: DEFAULT_DEBOUNCE,
            filter: FileFilter::go_sources(),
            coverage: false,
            focus_test_file: true,
            run_on_start: true,
            bell: true,
        }
    }

    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        Ok(Self {
            root: cfg.root().to_path_buf(),
            debounce: cfg.debounce(),
            filter: FileFilter::glob(cfg.filter())?,
            coverage: cfg.coverage(),
            focus_test_file: cfg.focus_test_file(),
            run_on_start: true,
            bell: cfg.bell(),
        })
    }
}

#[derive(Debug)]
enum LoopInput {
    Change(ChangeEvent),
    WatchError(TestwatchError),
    Batch(ChangeBatch),
    SourceClosed,
    Stop,
}

/// The watch loop.
///
/// Receives notifications from the source, feeds them to the aggregator,
/// and runs the tests for each debounced batch. Dispatch happens inline, so
/// while a run is in flight new notifications wait in the source's channel
/// and only start a fresh debounce window once the run is over.
pub struct Runtime<R: TestRunner> {
    settings: SessionSettings,
    source: NotificationSource,
    aggregator: ChangeAggregator,
    batches: mpsc::UnboundedReceiver<ChangeBatch>,
    resolver: ScopeResolver,
    runner: R,
    sink: Box<dyn ReportSink>,
    stop: StopSignal,
    fs: Arc<dyn FileSystem>,
}

impl<R: TestRunner> fmt::Debug for Runtime<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("settings", &self.settings)
            .field("source", &self.source.kind())
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl<R: TestRunner> Runtime<R> {
    pub fn new(
        settings: SessionSettings,
        source: NotificationSource,
        runner: R,
        sink: Box<dyn ReportSink>,
        stop: StopSignal,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let (aggregator, batches) = ChangeAggregator::new(settings.filter.clone(), settings.debounce);
        let resolver = ScopeResolver::detect(fs.as_ref(), &settings.root);
        Self {
            settings,
            source,
            aggregator,
            batches,
            resolver,
            runner,
            sink,
            stop,
            fs,
        }
    }

    pub fn failed_tests(&self) -> FailedTestSet {
        self.aggregator.failed_tests()
    }

    /// Main loop. Returns after a stop request or once the source's event
    /// stream ends; the source is closed either way.
    pub async fn run(mut self) -> Result<()> {
        info!(root = ?self.settings.root, "testwatch runtime started");

        if self.settings.run_on_start {
            self.dispatch(Vec::new()).await;
        }

        loop {
            match self.next_input().await {
                LoopInput::Change(event) => {
                    self.aggregator.record(&event);
                }
                LoopInput::WatchError(err) => {
                    warn!(error = %err, "watch error");
                    self.sink.write_line(&format!("Watch error: {err}"));
                    self.sink.flush();
                }
                LoopInput::Batch(batch) => {
                    self.dispatch(batch.paths).await;
                }
                LoopInput::SourceClosed => {
                    info!("notification source closed; exiting");
                    break;
                }
                LoopInput::Stop => {
                    info!("stop requested");
                    break;
                }
            }
        }

        self.shutdown().await
    }

    async fn next_input(&mut self) -> LoopInput {
        let (events, errors) = self.source.streams();
        tokio::select! {
            biased;
            _ = self.stop.stopped() => LoopInput::Stop,
            Some(err) = errors.recv() => LoopInput::WatchError(err),
            event = events.recv() => match event {
                Some(event) => LoopInput::Change(event),
                None => LoopInput::SourceClosed,
            },
            Some(batch) = self.batches.recv() => LoopInput::Batch(batch),
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.aggregator.cancel_timer();
        self.source.close().await?;
        info!("runtime exiting");
        Ok(())
    }

    /// Run the tests for one batch of changed paths (empty = unconditional)
    /// and report the verdict.
    ///
    /// Changes already pending are held for the length of the run and get a
    /// fresh debounce window once it is over.
    pub async fn dispatch(&mut self, changed: Vec<PathBuf>) -> RunVerdict {
        self.aggregator.cancel_timer();
        self.sink
            .write_line(&run_announcement(&self.settings.root, &changed));
        self.sink.flush();

        let failed = self.aggregator.failed_tests();
        let scope = self.resolver.resolve(&changed, &failed);

        let run_filter = if self.settings.focus_test_file && failed.is_empty() {
            focused_run_filter(self.fs.as_ref(), &changed)
        } else {
            None
        };

        let invocation =
            TestInvocation::new(scope, self.settings.coverage).with_run_filter(run_filter);
        debug!(
            scope = %invocation.scope,
            run_filter = ?invocation.run_filter,
            remembered_failures = failed.len(),
            "dispatching test run"
        );

        let verdict = match self.runner.run(&invocation).await {
            Ok(output) => classify(&output.text, output.success, invocation.coverage),
            Err(err) => {
                warn!(error = %err, "test command could not be started");
                RunVerdict::build_failure(format!("failed to start test command: {err:#}"))
            }
        };

        if verdict.is_success() && !verdict.exit_ok {
            warn!("test command exited with failure status but no failing tests were found");
        }
        info!(outcome = outcome_name(&verdict), exit_ok = verdict.exit_ok, "run finished");

        self.aggregator.apply_verdict(&verdict);

        for line in verdict_lines(&verdict) {
            self.sink.write_line(&line);
        }
        if !verdict.is_success() && self.settings.bell {
            self.sink.bell();
        }
        self.sink.flush();

        self.aggregator.rearm();
        verdict
    }
}

fn outcome_name(verdict: &RunVerdict) -> &'static str {
    match verdict.outcome {
        Outcome::Success => "success",
        Outcome::TestFailures { .. } => "test_failures",
        Outcome::BuildFailure(_) => "build_failure",
    }
}
