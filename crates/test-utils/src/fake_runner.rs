use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use testwatch::errors::{Result, TestwatchError};
use testwatch::exec::{RunOutput, TestInvocation, TestRunner};

use crate::go_output;

/// A fake test runner that:
/// - records every invocation it receives
/// - answers with scripted outputs in order, then with a passing run
/// - optionally takes `run_time` of (Tokio) time per run.
#[derive(Debug, Clone, Default)]
pub struct FakeRunner {
    invocations: Arc<Mutex<Vec<TestInvocation>>>,
    script: Arc<Mutex<VecDeque<Scripted>>>,
    run_time: Option<Duration>,
    spans: Arc<Mutex<Vec<(Instant, Instant)>>>,
}

#[derive(Debug, Clone)]
enum Scripted {
    Output(RunOutput),
    SpawnError(String),
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every run take `run_time` before answering.
    pub fn with_run_time(mut self, run_time: Duration) -> Self {
        self.run_time = Some(run_time);
        self
    }

    /// Queue the output of the next run.
    pub fn push_output(&self, text: impl Into<String>, success: bool) -> &Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Output(RunOutput {
                text: text.into(),
                success,
                exit_code: Some(if success { 0 } else { 1 }),
            }));
        self
    }

    /// Make the next run fail to start.
    pub fn push_spawn_error(&self, message: impl Into<String>) -> &Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::SpawnError(message.into()));
        self
    }

    pub fn invocations(&self) -> Vec<TestInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn run_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }

    /// `(started, finished)` for every completed run, in order.
    pub fn run_spans(&self) -> Vec<(Instant, Instant)> {
        self.spans.lock().unwrap().clone()
    }
}

impl TestRunner for FakeRunner {
    fn run<'a>(
        &'a mut self,
        invocation: &'a TestInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<RunOutput>> + Send + 'a>> {
        Box::pin(async move {
            let started = Instant::now();
            self.invocations.lock().unwrap().push(invocation.clone());
            if let Some(run_time) = self.run_time {
                tokio::time::sleep(run_time).await;
            }
            self.spans.lock().unwrap().push((started, Instant::now()));

            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Scripted::Output(output)) => Ok(output),
                Some(Scripted::SpawnError(message)) => {
                    Err(TestwatchError::IoError(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        message,
                    )))
                }
                None => Ok(RunOutput {
                    text: go_output::PASSING.to_string(),
                    success: true,
                    exit_code: Some(0),
                }),
            }
        })
    }
}
