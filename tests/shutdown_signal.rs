// tests/shutdown_signal.rs

#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::process::Command;

use testwatch::engine::{stop_channel, stop_on_signals};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn sigterm_requests_a_stop() -> TestResult {
    init_tracing();
    let (stop, mut signal) = stop_channel();
    let listener = stop_on_signals(stop)?;

    let status = Command::new("kill")
        .arg("-TERM")
        .arg(std::process::id().to_string())
        .status()?;
    assert!(status.success());

    with_timeout(signal.stopped()).await;
    assert!(signal.is_stopped());
    with_timeout(listener).await?;
    Ok(())
}
