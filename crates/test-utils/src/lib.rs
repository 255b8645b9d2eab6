pub mod builders;
pub mod fake_runner;
pub mod go_output;
pub mod recording_sink;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

pub use fake_runner::FakeRunner;
pub use recording_sink::RecordingSink;

static INIT: Once = Once::new();

/// Route `tracing` output into the test harness.
///
/// Output is captured per test and only shown for failures (or with
/// `--nocapture`). `RUST_LOG` picks the filter, e.g.
/// `RUST_LOG=testwatch::engine=debug cargo test`; the default is `warn`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("test timed out after 5 seconds")
}
