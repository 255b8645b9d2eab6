// tests/polling_source.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use tokio::time::{timeout, Duration};

use testwatch::errors::TestwatchError;
use testwatch::fs::mock::MockFileSystem;
use testwatch::source::{EventStream, NotificationSource, PollingWatcher, SourceKind};
use testwatch::types::{ChangeEvent, ChangeKind};

type TestResult = Result<(), Box<dyn Error>>;

const TICK: Duration = Duration::from_millis(200);

async fn next_event(events: &mut EventStream) -> Result<ChangeEvent, Box<dyn Error>> {
    let event = timeout(Duration::from_secs(5), events.recv())
        .await?
        .ok_or("event stream ended")?;
    Ok(event)
}

/// Everything emitted over the next few ticks.
async fn drain(events: &mut EventStream) -> Vec<ChangeEvent> {
    tokio::time::sleep(TICK * 3).await;
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn deleted_path_emits_one_remove_and_is_untracked() -> TestResult {
    init_tracing();
    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/proj/a/x.go", "package a");

    let mut watcher = PollingWatcher::new(fs.clone(), TICK)?;
    watcher.add(Path::new("/proj/a/x.go"))?;

    fs.remove("/proj/a/x.go");

    let (events, _) = watcher.streams();
    let event = next_event(events).await?;
    assert_eq!(event, ChangeEvent::new("/proj/a/x.go", ChangeKind::Remove));

    let rest = drain(events).await;
    assert!(rest.is_empty(), "unexpected events after removal: {rest:?}");
    assert!(watcher.watched().is_empty());

    watcher.close().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn modified_file_emits_write() -> TestResult {
    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/proj/a/x.go", "package a");

    let mut watcher = PollingWatcher::new(fs.clone(), TICK)?;
    watcher.add(Path::new("/proj/a/x.go"))?;

    assert!(drain(watcher.streams().0).await.is_empty());

    fs.add_file("/proj/a/x.go", "package a // edited");

    let event = next_event(watcher.streams().0).await?;
    assert_eq!(event, ChangeEvent::new("/proj/a/x.go", ChangeKind::Write));
    assert_eq!(watcher.watched(), vec![Path::new("/proj/a/x.go").to_path_buf()]);

    watcher.close().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn watched_directories_report_their_files() -> TestResult {
    let fs = Arc::new(MockFileSystem::new());
    fs.add_dir("/proj/a");

    let mut watcher = PollingWatcher::new(fs.clone(), TICK)?;
    watcher.add(Path::new("/proj/a"))?;

    let child = ChangeEvent::new("/proj/a/new.go", ChangeKind::Create);
    fs.add_file("/proj/a/new.go", "package a");
    let seen = drain(watcher.streams().0).await;
    assert_eq!(seen.iter().filter(|e| **e == child).count(), 1, "{seen:?}");

    fs.add_file("/proj/a/new.go", "package a\n\nfunc F() {}");
    let seen = drain(watcher.streams().0).await;
    assert_eq!(
        seen,
        vec![ChangeEvent::new("/proj/a/new.go", ChangeKind::Write)]
    );

    fs.remove("/proj/a/new.go");
    let seen = drain(watcher.streams().0).await;
    assert!(seen.contains(&ChangeEvent::new("/proj/a/new.go", ChangeKind::Remove)));
    assert_eq!(watcher.watched(), vec![Path::new("/proj/a").to_path_buf()]);

    watcher.close().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unreadable_directory_reports_an_error_and_keeps_its_children() -> TestResult {
    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/proj/a/x.go", "package a");
    fs.add_file("/proj/a/y.go", "package a");

    let mut watcher = PollingWatcher::new(fs.clone(), TICK)?;
    watcher.add(Path::new("/proj/a"))?;

    fs.set_unreadable("/proj/a", true);
    assert!(drain(watcher.streams().0).await.is_empty());
    let (_, errors) = watcher.streams();
    assert!(errors.try_recv().is_ok(), "listing failure was not reported");

    fs.set_unreadable("/proj/a", false);
    let seen = drain(watcher.streams().0).await;
    assert!(seen.is_empty(), "recovered listing produced events: {seen:?}");

    fs.add_file("/proj/a/y.go", "package a // edited");
    let event = next_event(watcher.streams().0).await?;
    assert_eq!(event, ChangeEvent::new("/proj/a/y.go", ChangeKind::Write));

    watcher.close().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn close_is_idempotent_and_ends_the_streams() -> TestResult {
    let fs = Arc::new(MockFileSystem::new());
    fs.add_dir("/proj");

    let mut watcher = PollingWatcher::new(fs.clone(), TICK)?;
    watcher.add(Path::new("/proj"))?;

    watcher.close().await?;
    watcher.close().await?;

    let (events, errors) = watcher.streams();
    assert!(events.recv().await.is_none());
    assert!(errors.recv().await.is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn add_and_remove_errors() -> TestResult {
    let fs = Arc::new(MockFileSystem::new());
    let mut watcher = PollingWatcher::new(fs.clone(), TICK)?;

    assert!(watcher.add(Path::new("/missing")).is_err());

    let err = watcher
        .remove(Path::new("/never/added"))
        .expect_err("remove of an unknown path should fail");
    assert!(matches!(err, TestwatchError::NotWatched(_)));

    assert!(PollingWatcher::new(fs.clone(), Duration::ZERO).is_err());

    watcher.close().await?;
    Ok(())
}

#[test]
fn polling_needs_a_runtime() {
    let fs = Arc::new(MockFileSystem::new());
    assert!(PollingWatcher::new(fs, TICK).is_err());
}

#[tokio::test(start_paused = true)]
async fn failed_event_watcher_falls_back_to_polling() -> TestResult {
    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/proj/main.go", "package main");

    let mut source = NotificationSource::or_polling(
        Err(TestwatchError::SourceUnavailable("inotify limit reached".to_string())),
        fs.clone(),
        TICK,
    )?;
    assert_eq!(source.kind(), SourceKind::Polling);

    source.add(Path::new("/proj"))?;
    fs.add_file("/proj/main.go", "package main // edited");

    let event = next_event(source.events()).await?;
    assert_eq!(event, ChangeEvent::new("/proj/main.go", ChangeKind::Write));

    source.close().await?;
    source.close().await?;
    Ok(())
}
