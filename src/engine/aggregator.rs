// src/engine/aggregator.rs

//! Trailing debounce over change notifications.
//!
//! Qualifying events land in a pending set and (re)start a single timer.
//! When the timer fires it takes the whole set and emits it as one
//! [`ChangeBatch`]. The pending set and the failed-test memory share one
//! mutex because the timer task and the loop both touch them.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::report::RunVerdict;
use crate::types::{ChangeEvent, FailedTestSet};
use crate::watch::FileFilter;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Paths captured when the debounce timer fired, sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBatch {
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Default)]
struct AggregatorState {
    pending: HashSet<PathBuf>,
    failed: FailedTestSet,
    /// Bumped on every insertion; a timer only flushes if nothing arrived
    /// after it was armed.
    generation: u64,
}

impl AggregatorState {
    fn take_if_current(&mut self, generation: u64) -> Option<ChangeBatch> {
        if generation != self.generation || self.pending.is_empty() {
            return None;
        }
        let mut paths: Vec<PathBuf> = self.pending.drain().collect();
        paths.sort();
        Some(ChangeBatch { paths })
    }
}

#[derive(Debug)]
pub struct ChangeAggregator {
    state: Arc<Mutex<AggregatorState>>,
    filter: FileFilter,
    delay: Duration,
    timer: Option<JoinHandle<()>>,
    batch_tx: mpsc::UnboundedSender<ChangeBatch>,
}

impl ChangeAggregator {
    /// Build an aggregator and the receiving end for its batches.
    ///
    /// `record` spawns the timer task, so it must run inside a Tokio runtime.
    pub fn new(filter: FileFilter, delay: Duration) -> (Self, mpsc::UnboundedReceiver<ChangeBatch>) {
        let (batch_tx, batch_rx) = mpsc::unbounded_channel();
        let aggregator = Self {
            state: Arc::new(Mutex::new(AggregatorState::default())),
            filter,
            delay,
            timer: None,
            batch_tx,
        };
        (aggregator, batch_rx)
    }

    /// Feed one notification. Returns `true` if it was kept and the timer
    /// was restarted.
    ///
    /// Only `Write` and `Create` count, and only for paths the filter accepts.
    pub fn record(&mut self, event: &ChangeEvent) -> bool {
        if !event.kind.triggers_run() {
            trace!(path = ?event.path, kind = ?event.kind, "ignoring non-triggering change");
            return false;
        }
        if !self.filter.matches(&event.path) {
            trace!(path = ?event.path, filter = self.filter.description(), "path rejected by filter");
            return false;
        }

        let generation = {
            let mut state = lock(&self.state);
            state.pending.insert(event.path.clone());
            state.generation += 1;
            state.generation
        };
        debug!(path = ?event.path, generation, "change recorded; restarting debounce timer");

        self.restart_timer(generation);
        true
    }

    fn restart_timer(&mut self, generation: u64) {
        self.cancel_timer();

        let state = Arc::clone(&self.state);
        let tx = self.batch_tx.clone();
        let delay = self.delay;

        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let batch = lock(&state).take_if_current(generation);
            if let Some(batch) = batch {
                debug!(generation, files = batch.paths.len(), "debounce window elapsed");
                let _ = tx.send(batch);
            }
        }));
    }

    /// Disarm the timer. Pending paths stay where they are.
    pub fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }

    /// Start a fresh debounce window for whatever is still pending.
    /// Returns `false` (and arms nothing) when the pending set is empty.
    pub fn rearm(&mut self) -> bool {
        let generation = {
            let state = lock(&self.state);
            if state.pending.is_empty() {
                return false;
            }
            state.generation
        };
        debug!(generation, "re-arming debounce timer for held changes");
        self.restart_timer(generation);
        true
    }

    /// Whether a timer is armed and has not fired yet.
    pub fn is_armed(&self) -> bool {
        self.timer.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn pending_len(&self) -> usize {
        lock(&self.state).pending.len()
    }

    /// Snapshot of the failed-test memory.
    pub fn failed_tests(&self) -> FailedTestSet {
        lock(&self.state).failed.clone()
    }

    /// Fold a verdict into the failed-test memory.
    ///
    /// A fully green run clears it, test failures add to it, and anything
    /// else (build failures, success with a failing exit status) leaves it.
    pub fn apply_verdict(&self, verdict: &RunVerdict) {
        let mut state = lock(&self.state);
        if verdict.is_fully_green() {
            if !state.failed.is_empty() {
                debug!(cleared = state.failed.len(), "clearing failed-test memory");
            }
            state.failed.clear();
        } else {
            let failed = verdict.failed_tests();
            if !failed.is_empty() {
                state.failed.extend(failed.iter().cloned());
                debug!(remembered = state.failed.len(), "recorded failing tests");
            }
        }
    }
}

impl Drop for ChangeAggregator {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

fn lock(state: &Mutex<AggregatorState>) -> MutexGuard<'_, AggregatorState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
