// src/report/mod.rs

//! Turning captured test output into something a person reads.
//!
//! - [`classify`] parses combined `go test -v` output into a [`RunVerdict`].
//! - [`format`] renders verdicts and status lines as plain text.
//! - [`sink`] is where those lines go: a plain stream or a live display.

pub mod classify;
pub mod format;
pub mod sink;

pub use classify::{classify, Outcome, RunVerdict, BUILD_FAILURE_MARKERS};
pub use sink::{LiveSink, PlainSink, ReportSink};
