// src/exec/backend.rs

//! Pluggable test runner abstraction.
//!
//! The runtime talks to a `TestRunner` instead of spawning processes
//! itself, so tests can script outputs without a Go toolchain.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::errors::Result;
use crate::exec::command::TestInvocation;

/// Captured result of one test-command run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// Standard output and standard error, merged.
    pub text: String,
    /// Whether the process exited successfully.
    pub success: bool,
    pub exit_code: Option<i32>,
}

/// Trait abstracting how the test command is executed.
///
/// `run` resolves only once the command has finished; the runtime awaits it
/// before doing anything else, so runs never overlap.
pub trait TestRunner: Send {
    /// An `Err` means the command could not be run at all (for example the
    /// executable was not found), as opposed to running and failing.
    fn run<'a>(
        &'a mut self,
        invocation: &'a TestInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<RunOutput>> + Send + 'a>>;
}

/// Runs `<program> test -v ...` in the watch root.
#[derive(Debug, Clone)]
pub struct GoTestRunner {
    program: String,
    root: PathBuf,
}

impl GoTestRunner {
    pub fn new(program: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            root: root.into(),
        }
    }
}

impl TestRunner for GoTestRunner {
    fn run<'a>(
        &'a mut self,
        invocation: &'a TestInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<RunOutput>> + Send + 'a>> {
        Box::pin(async move {
            let args = invocation.args();
            info!(program = %self.program, ?args, "starting test command");

            let mut child = Command::new(&self.program)
                .args(&args)
                .current_dir(&self.root)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .with_context(|| format!("spawning `{}`", self.program))?;

            // Both pipes feed one channel, so lines keep their order within a
            // stream but stdout/stderr interleaving follows arrival only.
            let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
            if let Some(stdout) = child.stdout.take() {
                tokio::spawn(forward_lines(stdout, line_tx.clone(), "stdout"));
            }
            if let Some(stderr) = child.stderr.take() {
                tokio::spawn(forward_lines(stderr, line_tx.clone(), "stderr"));
            }
            drop(line_tx);

            let status = child
                .wait()
                .await
                .with_context(|| format!("waiting for `{}`", self.program))?;

            let mut text = String::new();
            while let Some(line) = line_rx.recv().await {
                text.push_str(&line);
                text.push('\n');
            }

            debug!(
                exit_code = ?status.code(),
                success = status.success(),
                bytes = text.len(),
                "test command exited"
            );

            Ok(RunOutput {
                text,
                success: status.success(),
                exit_code: status.code(),
            })
        })
    }
}

/// Read `reader` line by line (lossy UTF-8) into `tx` until EOF.
async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>, stream: &'static str)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                trace!(stream, "{}", line);
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(err) => {
                debug!(stream, error = %err, "stopped reading test output");
                break;
            }
        }
    }
}
