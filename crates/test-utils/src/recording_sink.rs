use std::sync::{Arc, Mutex};

use testwatch::report::ReportSink;

#[derive(Debug, Default)]
struct Recorded {
    lines: Vec<String>,
    bells: usize,
    flushes: usize,
}

/// A sink that keeps everything written to it. Clones share the record, so
/// a test can hand one clone to the runtime and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.inner.lock().unwrap().lines.clone()
    }

    pub fn bells(&self) -> usize {
        self.inner.lock().unwrap().bells
    }

    pub fn flushes(&self) -> usize {
        self.inner.lock().unwrap().flushes
    }

    /// Lines that start with `prefix`.
    pub fn lines_starting_with(&self, prefix: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.starts_with(prefix))
            .collect()
    }
}

impl ReportSink for RecordingSink {
    fn write_line(&mut self, line: &str) {
        self.inner.lock().unwrap().lines.push(line.to_string());
    }

    fn bell(&mut self) {
        self.inner.lock().unwrap().bells += 1;
    }

    fn flush(&mut self) {
        self.inner.lock().unwrap().flushes += 1;
    }
}
