// src/source/mod.rs

//! File-change notification sources.
//!
//! Two interchangeable strategies sit behind [`NotificationSource`]:
//! - [`EventWatcher`]: OS change notifications via `notify`.
//! - [`PollingWatcher`]: periodic `stat` diffing on a Tokio task.
//!
//! The strategy is chosen once, when the source is built. If the
//! event-driven watcher cannot be constructed the source falls back to
//! polling and never re-checks afterwards.
//!
//! Both variants deliver changes and errors on unbounded channels, so
//! `add`/`remove` never wait on a consumer.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::errors::{Result, TestwatchError};
use crate::fs::FileSystem;
use crate::types::ChangeEvent;

pub mod event;
pub mod poll;

pub use event::{change_kind, EventWatcher};
pub use poll::{PollingWatcher, DEFAULT_POLL_INTERVAL};

/// Stream of change notifications; ends once the source is closed.
pub type EventStream = mpsc::UnboundedReceiver<ChangeEvent>;

/// Stream of non-fatal watch errors; ends once the source is closed.
pub type ErrorStream = mpsc::UnboundedReceiver<TestwatchError>;

/// Which strategy backs a [`NotificationSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    EventDriven,
    Polling,
}

/// A file-change notification source.
#[derive(Debug)]
pub enum NotificationSource {
    EventDriven(EventWatcher),
    Polling(PollingWatcher),
}

impl NotificationSource {
    /// Build an event-driven source, falling back to polling if the OS
    /// facility is unavailable (unsupported platform, watch limits, ...).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(fs: Arc<dyn FileSystem>, poll_interval: Duration) -> Result<Self> {
        Self::or_polling(EventWatcher::new(), fs, poll_interval)
    }

    /// Use `attempt` if it succeeded, otherwise build a polling source.
    ///
    /// Fails only when neither strategy can be constructed.
    pub fn or_polling(
        attempt: Result<EventWatcher>,
        fs: Arc<dyn FileSystem>,
        poll_interval: Duration,
    ) -> Result<Self> {
        match attempt {
            Ok(watcher) => {
                info!("using OS change notifications");
                Ok(Self::EventDriven(watcher))
            }
            Err(event_err) => {
                warn!(
                    error = %event_err,
                    "event-driven watcher unavailable; falling back to polling"
                );
                Self::polling(fs, poll_interval).map_err(|poll_err| {
                    TestwatchError::SourceUnavailable(format!(
                        "event-driven watcher failed ({event_err}); polling watcher failed ({poll_err})"
                    ))
                })
            }
        }
    }

    /// Build a polling source directly.
    pub fn polling(fs: Arc<dyn FileSystem>, poll_interval: Duration) -> Result<Self> {
        let watcher = PollingWatcher::new(fs, poll_interval)?;
        info!(interval = ?poll_interval, "using polling watcher");
        Ok(Self::Polling(watcher))
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Self::EventDriven(_) => SourceKind::EventDriven,
            Self::Polling(_) => SourceKind::Polling,
        }
    }

    /// Start watching `path` (a directory is watched non-recursively).
    pub fn add(&mut self, path: &Path) -> Result<()> {
        match self {
            Self::EventDriven(w) => w.add(path),
            Self::Polling(w) => w.add(path),
        }
    }

    /// Stop watching `path`.
    pub fn remove(&mut self, path: &Path) -> Result<()> {
        match self {
            Self::EventDriven(w) => w.remove(path),
            Self::Polling(w) => w.remove(path),
        }
    }

    pub fn events(&mut self) -> &mut EventStream {
        self.streams().0
    }

    pub fn errors(&mut self) -> &mut ErrorStream {
        self.streams().1
    }

    /// Both streams at once, for multiplexed waiting.
    pub fn streams(&mut self) -> (&mut EventStream, &mut ErrorStream) {
        match self {
            Self::EventDriven(w) => w.streams(),
            Self::Polling(w) => w.streams(),
        }
    }

    /// Stop watching and release OS resources.
    ///
    /// For the polling variant this waits for the poll loop to exit, so no
    /// event is sent after `close` returns. Calling it again is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        match self {
            Self::EventDriven(w) => w.close(),
            Self::Polling(w) => w.close().await,
        }
    }
}
