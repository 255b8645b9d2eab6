// tests/aggregator_debounce.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::PathBuf;

use tokio::time::{Duration, Instant};

use testwatch::engine::ChangeAggregator;
use testwatch::report::{classify, RunVerdict};
use testwatch::types::{ChangeEvent, ChangeKind};
use testwatch::watch::FileFilter;
use testwatch_test_utils::go_output;

type TestResult = Result<(), Box<dyn Error>>;

const DELAY: Duration = Duration::from_millis(500);

fn write(path: &str) -> ChangeEvent {
    ChangeEvent::new(path, ChangeKind::Write)
}

#[tokio::test(start_paused = true)]
async fn burst_within_delay_produces_one_batch() -> TestResult {
    init_tracing();
    let (mut aggregator, mut batches) = ChangeAggregator::new(FileFilter::go_sources(), DELAY);
    let start = Instant::now();

    for path in ["/p/c.go", "/p/a.go", "/p/b.go"] {
        assert!(aggregator.record(&write(path)));
        tokio::time::advance(Duration::from_millis(200)).await;
    }
    assert!(batches.try_recv().is_err(), "fired before the quiet period");

    let batch = batches.recv().await.ok_or("batch channel closed")?;

    // Last event at t=400ms, so the batch lands at t=900ms.
    assert!(start.elapsed() >= Duration::from_millis(900));
    assert_eq!(
        batch.paths,
        vec![
            PathBuf::from("/p/a.go"),
            PathBuf::from("/p/b.go"),
            PathBuf::from("/p/c.go"),
        ]
    );
    assert_eq!(aggregator.pending_len(), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(batches.try_recv().is_err(), "burst produced a second batch");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn later_event_produces_a_separate_batch() -> TestResult {
    let (mut aggregator, mut batches) = ChangeAggregator::new(FileFilter::go_sources(), DELAY);

    aggregator.record(&write("/p/a.go"));
    let first = batches.recv().await.ok_or("batch channel closed")?;
    assert_eq!(first.paths, vec![PathBuf::from("/p/a.go")]);

    tokio::time::sleep(DELAY * 2).await;

    aggregator.record(&write("/p/b.go"));
    let second = batches.recv().await.ok_or("batch channel closed")?;
    assert_eq!(second.paths, vec![PathBuf::from("/p/b.go")]);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn repeated_writes_to_one_path_are_deduplicated() -> TestResult {
    let (mut aggregator, mut batches) = ChangeAggregator::new(FileFilter::go_sources(), DELAY);

    aggregator.record(&write("/p/a.go"));
    aggregator.record(&ChangeEvent::new("/p/a.go", ChangeKind::Create));
    aggregator.record(&write("/p/a.go"));
    assert_eq!(aggregator.pending_len(), 1);

    let batch = batches.recv().await.ok_or("batch channel closed")?;
    assert_eq!(batch.paths, vec![PathBuf::from("/p/a.go")]);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn non_triggering_and_filtered_events_are_ignored() {
    let (mut aggregator, mut batches) = ChangeAggregator::new(FileFilter::go_sources(), DELAY);

    for kind in [
        ChangeKind::Remove,
        ChangeKind::Rename,
        ChangeKind::PermissionChange,
    ] {
        assert!(!aggregator.record(&ChangeEvent::new("/p/a.go", kind)));
    }
    assert!(!aggregator.record(&write("/p/README.md")));

    assert!(!aggregator.is_armed());
    assert_eq!(aggregator.pending_len(), 0);

    tokio::time::sleep(DELAY * 4).await;
    assert!(batches.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn custom_filters_decide_relevance() {
    let filter = FileFilter::glob("*_test.go").expect("valid glob");
    let (mut aggregator, _batches) = ChangeAggregator::new(filter, DELAY);

    assert!(!aggregator.record(&write("/p/a.go")));
    assert!(aggregator.record(&write("/p/a_test.go")));
}

#[tokio::test(start_paused = true)]
async fn cancelling_the_timer_keeps_pending_paths() {
    let (mut aggregator, mut batches) = ChangeAggregator::new(FileFilter::go_sources(), DELAY);

    aggregator.record(&write("/p/a.go"));
    assert!(aggregator.is_armed());

    aggregator.cancel_timer();
    assert!(!aggregator.is_armed());

    tokio::time::sleep(DELAY * 4).await;
    assert!(batches.try_recv().is_err());
    assert_eq!(aggregator.pending_len(), 1);
}

#[tokio::test(start_paused = true)]
async fn rearming_starts_a_fresh_window_for_held_paths() -> TestResult {
    let (mut aggregator, mut batches) = ChangeAggregator::new(FileFilter::go_sources(), DELAY);
    assert!(!aggregator.rearm(), "nothing pending, nothing to arm");

    aggregator.record(&write("/p/a.go"));
    aggregator.cancel_timer();
    tokio::time::sleep(DELAY * 3).await;
    assert!(batches.try_recv().is_err());

    let rearmed_at = Instant::now();
    assert!(aggregator.rearm());
    assert!(aggregator.is_armed());

    let batch = batches.recv().await.ok_or("batch channel closed")?;
    assert!(rearmed_at.elapsed() >= DELAY);
    assert_eq!(batch.paths, vec![PathBuf::from("/p/a.go")]);
    assert_eq!(aggregator.pending_len(), 0);
    Ok(())
}

#[tokio::test]
async fn verdicts_update_the_failure_memory() {
    let (aggregator, _batches) = ChangeAggregator::new(FileFilter::go_sources(), DELAY);

    aggregator.apply_verdict(&classify(go_output::TWO_FAILURES, false, false));
    assert_eq!(aggregator.failed_tests().len(), 2);

    aggregator.apply_verdict(&classify(go_output::ONE_FAILURE, false, false));
    assert_eq!(
        aggregator.failed_tests().identifiers(),
        vec![
            "example.com/calc/a/TestAdd",
            "example.com/calc/a/TestDiv",
            "example.com/calc/a/TestSub",
        ]
    );

    // Neither a build failure nor a pass with a failing exit status clears it.
    aggregator.apply_verdict(&RunVerdict::build_failure("boom"));
    aggregator.apply_verdict(&classify(go_output::PASSING, false, false));
    assert_eq!(aggregator.failed_tests().len(), 3);

    aggregator.apply_verdict(&classify(go_output::PASSING, true, false));
    assert!(aggregator.failed_tests().is_empty());
}
