// src/source/poll.rs

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::errors::{Result, TestwatchError};
use crate::fs::{FileStat, FileSystem};
use crate::source::{ErrorStream, EventStream};
use crate::types::{ChangeEvent, ChangeKind};

/// Default time between polling scans.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// What the poller remembers about one watched path.
///
/// For a directory, `children` holds the direct non-directory entries so
/// files created, edited or deleted inside it are reported as well.
#[derive(Debug, Clone)]
struct Snapshot {
    stat: FileStat,
    children: HashMap<PathBuf, FileStat>,
}

type Tracked = Arc<Mutex<HashMap<PathBuf, Snapshot>>>;

/// Notification source that compares `stat` results on a fixed tick.
pub struct PollingWatcher {
    fs: Arc<dyn FileSystem>,
    files: Tracked,
    events: EventStream,
    errors: ErrorStream,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for PollingWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingWatcher")
            .field("watched", &lock_files(&self.files).len())
            .field("closed", &self.task.is_none())
            .finish_non_exhaustive()
    }
}

impl PollingWatcher {
    /// Create the watcher and start its poll loop on the current Tokio runtime.
    pub fn new(fs: Arc<dyn FileSystem>, interval: Duration) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            TestwatchError::SourceUnavailable(format!("polling watcher needs a Tokio runtime: {e}"))
        })?;
        if interval.is_zero() {
            return Err(TestwatchError::ConfigError(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        let (event_tx, events) = mpsc::unbounded_channel::<ChangeEvent>();
        let (error_tx, errors) = mpsc::unbounded_channel::<TestwatchError>();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let files: Tracked = Arc::new(Mutex::new(HashMap::new()));

        let task = runtime.spawn(poll_loop(
            Arc::clone(&fs),
            Arc::clone(&files),
            interval,
            event_tx,
            error_tx,
            stop_rx,
        ));

        Ok(Self {
            fs,
            files,
            events,
            errors,
            stop: Some(stop_tx),
            task: Some(task),
        })
    }

    /// Start tracking `path`, recording its current state as the baseline.
    pub fn add(&mut self, path: &Path) -> Result<()> {
        let snapshot = take_snapshot(self.fs.as_ref(), path)?;
        lock_files(&self.files).insert(path.to_path_buf(), snapshot);
        debug!(?path, "polling path");
        Ok(())
    }

    pub fn remove(&mut self, path: &Path) -> Result<()> {
        match lock_files(&self.files).remove(path) {
            Some(_) => Ok(()),
            None => Err(TestwatchError::NotWatched(path.to_path_buf())),
        }
    }

    /// Paths currently tracked, sorted.
    pub fn watched(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = lock_files(&self.files).keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn streams(&mut self) -> (&mut EventStream, &mut ErrorStream) {
        (&mut self.events, &mut self.errors)
    }

    /// Signal the poll loop to stop and wait for it to exit.
    ///
    /// The loop owns the channel senders, so the streams end only after it
    /// has finished its last scan.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!(error = %err, "polling loop ended abnormally");
            }
            debug!("polling watcher closed");
        }
        Ok(())
    }
}

fn lock_files(files: &Tracked) -> MutexGuard<'_, HashMap<PathBuf, Snapshot>> {
    files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn poll_loop(
    fs: Arc<dyn FileSystem>,
    files: Tracked,
    interval: Duration,
    event_tx: mpsc::UnboundedSender<ChangeEvent>,
    error_tx: mpsc::UnboundedSender<TestwatchError>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the baseline was taken by `add`.
    ticker.tick().await;

    loop {
        tokio::select! {
            // Also fires if the watcher was dropped without `close`.
            _ = &mut stop_rx => break,
            _ = ticker.tick() => scan(fs.as_ref(), &files, &event_tx, &error_tx),
        }
    }

    debug!("polling loop finished");
}

/// Compare every tracked path against its snapshot and emit the differences.
fn scan(
    fs: &dyn FileSystem,
    files: &Tracked,
    event_tx: &mpsc::UnboundedSender<ChangeEvent>,
    error_tx: &mpsc::UnboundedSender<TestwatchError>,
) {
    let mut files = lock_files(files);
    let mut vanished = Vec::new();

    for (path, snapshot) in files.iter_mut() {
        match fs.metadata(path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                emit(event_tx, path, ChangeKind::Remove);
                vanished.push(path.clone());
            }
            Err(err) => {
                let _ = error_tx.send(TestwatchError::from(err));
            }
            Ok(stat) => {
                if changed(&snapshot.stat, &stat) {
                    emit(event_tx, path, ChangeKind::Write);
                }
                snapshot.stat = stat;
                if stat.is_dir {
                    diff_children(fs, path, snapshot, event_tx, error_tx);
                }
            }
        }
    }

    for path in vanished {
        debug!(?path, "watched path disappeared; no longer tracking");
        files.remove(&path);
    }
}

fn diff_children(
    fs: &dyn FileSystem,
    dir: &Path,
    snapshot: &mut Snapshot,
    event_tx: &mpsc::UnboundedSender<ChangeEvent>,
    error_tx: &mpsc::UnboundedSender<TestwatchError>,
) {
    // An unreadable listing says nothing about the children; keep the old set.
    let current = match list_children(fs, dir) {
        Ok(current) => current,
        Err(err) => {
            let _ = error_tx.send(TestwatchError::from(err));
            return;
        }
    };

    for (child, stat) in &current {
        match snapshot.children.get(child) {
            None => emit(event_tx, child, ChangeKind::Create),
            Some(old) if changed(old, stat) => emit(event_tx, child, ChangeKind::Write),
            Some(_) => {}
        }
    }
    for child in snapshot.children.keys() {
        if !current.contains_key(child) {
            emit(event_tx, child, ChangeKind::Remove);
        }
    }

    snapshot.children = current;
}

fn changed(old: &FileStat, new: &FileStat) -> bool {
    old.modified != new.modified || old.len != new.len
}

fn emit(event_tx: &mpsc::UnboundedSender<ChangeEvent>, path: &Path, kind: ChangeKind) {
    // A closed receiver just means nobody is listening any more.
    let _ = event_tx.send(ChangeEvent::new(path, kind));
}

fn take_snapshot(fs: &dyn FileSystem, path: &Path) -> io::Result<Snapshot> {
    let stat = fs.metadata(path)?;
    let children = if stat.is_dir {
        list_children(fs, path).unwrap_or_else(|err| {
            debug!(?path, error = %err, "could not list directory; starting with no children");
            HashMap::new()
        })
    } else {
        HashMap::new()
    };
    Ok(Snapshot { stat, children })
}

fn list_children(fs: &dyn FileSystem, dir: &Path) -> anyhow::Result<HashMap<PathBuf, FileStat>> {
    let entries = fs.read_dir(dir)?;

    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            // Entries can vanish between listing and stat; skip them.
            let stat = fs.metadata(&entry).ok()?;
            (!stat.is_dir).then_some((entry, stat))
        })
        .collect())
}
