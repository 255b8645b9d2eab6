// src/report/sink.rs

//! Presentation sinks.
//!
//! The runtime writes status lines in order and calls `flush` at the end of
//! each block (an announcement, a verdict). What a sink does with a block
//! is up to it.

use std::io::{self, Stdout, Write};

use tracing::debug;

/// Receives ordered, human-readable status output.
pub trait ReportSink: Send {
    fn write_line(&mut self, line: &str);

    /// Audible alert (terminal bell).
    fn bell(&mut self);

    /// End of a block of lines.
    fn flush(&mut self);
}

/// Appends every line to a writer.
#[derive(Debug)]
pub struct PlainSink<W: Write + Send> {
    out: W,
}

impl PlainSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> PlainSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ReportSink for PlainSink<W> {
    fn write_line(&mut self, line: &str) {
        if let Err(err) = writeln!(self.out, "{line}") {
            debug!(error = %err, "failed to write status line");
        }
    }

    fn bell(&mut self) {
        let _ = self.out.write_all(b"\x07");
        let _ = self.out.flush();
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }
}

const CURSOR_UP_CLEAR_LINE: &str = "\x1b[1A\x1b[2K";

/// Redraws in place: each flushed block replaces the previously drawn one.
#[derive(Debug)]
pub struct LiveSink<W: Write + Send> {
    out: W,
    pending: Vec<String>,
    drawn: usize,
}

impl LiveSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> LiveSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            pending: Vec::new(),
            drawn: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn redraw(&mut self) -> io::Result<()> {
        for _ in 0..self.drawn {
            self.out.write_all(CURSOR_UP_CLEAR_LINE.as_bytes())?;
        }
        for line in &self.pending {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }
}

impl<W: Write + Send> ReportSink for LiveSink<W> {
    fn write_line(&mut self, line: &str) {
        // Embedded newlines would throw off the line count used for erasing.
        self.pending.extend(line.split('\n').map(str::to_string));
    }

    fn bell(&mut self) {
        let _ = self.out.write_all(b"\x07");
        let _ = self.out.flush();
    }

    fn flush(&mut self) {
        if let Err(err) = self.redraw() {
            debug!(error = %err, "failed to redraw live output");
        }
        self.drawn = self.pending.len();
        self.pending.clear();
    }
}
