// src/source/event.rs

use std::path::Path;

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::debug;

use crate::errors::{Result, TestwatchError};
use crate::source::{ErrorStream, EventStream};
use crate::types::{ChangeEvent, ChangeKind};

/// Notification source backed by the platform's recommended `notify` watcher.
///
/// Dropping the inner watcher (on `close`) drops the callback and with it
/// both channel senders, which ends the streams.
pub struct EventWatcher {
    inner: Option<RecommendedWatcher>,
    events: EventStream,
    errors: ErrorStream,
}

impl std::fmt::Debug for EventWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventWatcher")
            .field("closed", &self.inner.is_none())
            .finish_non_exhaustive()
    }
}

impl EventWatcher {
    pub fn new() -> Result<Self> {
        let (event_tx, events) = mpsc::unbounded_channel::<ChangeEvent>();
        let (error_tx, errors) = mpsc::unbounded_channel::<TestwatchError>();

        // Called synchronously on notify's own thread.
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let Some(kind) = change_kind(&event.kind) else {
                        return;
                    };
                    for path in event.paths {
                        if event_tx.send(ChangeEvent::new(path, kind)).is_err() {
                            return;
                        }
                    }
                }
                Err(err) => {
                    let _ = error_tx.send(TestwatchError::from(err));
                }
            },
            Config::default(),
        )?;

        Ok(Self {
            inner: Some(watcher),
            events,
            errors,
        })
    }

    pub fn add(&mut self, path: &Path) -> Result<()> {
        let watcher = self.inner.as_mut().ok_or_else(closed_error)?;
        watcher.watch(path, RecursiveMode::NonRecursive)?;
        debug!(?path, "watching directory");
        Ok(())
    }

    pub fn remove(&mut self, path: &Path) -> Result<()> {
        let watcher = self.inner.as_mut().ok_or_else(closed_error)?;
        watcher.unwatch(path)?;
        Ok(())
    }

    pub fn streams(&mut self) -> (&mut EventStream, &mut ErrorStream) {
        (&mut self.events, &mut self.errors)
    }

    pub fn close(&mut self) -> Result<()> {
        if self.inner.take().is_some() {
            debug!("event-driven watcher closed");
        }
        Ok(())
    }
}

fn closed_error() -> TestwatchError {
    TestwatchError::SourceUnavailable("event-driven watcher is closed".to_string())
}

/// Map a `notify` event kind onto a [`ChangeKind`].
///
/// Access notifications and kinds the backend could not classify are
/// dropped.
pub fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Create),
        EventKind::Remove(_) => Some(ChangeKind::Remove),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Rename),
        EventKind::Modify(ModifyKind::Metadata(_)) => Some(ChangeKind::PermissionChange),
        EventKind::Modify(_) => Some(ChangeKind::Write),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}
