// src/report/classify.rs

//! Outcome classification for captured `go test -v` output.
//!
//! The classifier is a pure function of the captured text, the exit status
//! and whether coverage was requested; the same input always yields the
//! same verdict.
//!
//! Precedence:
//! 1. exit failure plus a build-failure marker → [`Outcome::BuildFailure`]
//! 2. any `--- FAIL:` line → [`Outcome::TestFailures`]
//! 3. otherwise → [`Outcome::Success`], even when the command exited with a
//!    failure status. That last case is a heuristic: the verdict keeps
//!    `exit_ok = false` so it is never hidden.

use crate::types::FailedTest;

/// Phrases `go` prints when a package could not be built or set up.
pub const BUILD_FAILURE_MARKERS: &[&str] = &[
    "[build failed]",
    "[setup failed]",
    "cannot find package",
    "no required module provides package",
];

const FAIL_MARKER: &str = "--- FAIL:";
const RUN_MARKER: &str = "=== RUN";
const TEST_MARKER_PREFIX: &str = "=== ";

/// What a run amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    TestFailures {
        count: usize,
        tests: Vec<FailedTest>,
        sections: Vec<String>,
    },
    /// Raw captured text (or the spawn error) for display.
    BuildFailure(String),
}

/// Classified result of one test-command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunVerdict {
    pub outcome: Outcome,
    /// Duration from the first `ok` summary line, without `(cached)`.
    pub duration: Option<String>,
    /// Coverage figure (e.g. `87.3%`), only when coverage was requested.
    pub coverage: Option<String>,
    /// Whether the test command itself reported success.
    pub exit_ok: bool,
}

impl RunVerdict {
    /// Verdict for a command that could not be started or did not build.
    pub fn build_failure(raw: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::BuildFailure(raw.into()),
            duration: None,
            coverage: None,
            exit_ok: false,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success)
    }

    /// Success with a clean exit status.
    pub fn is_fully_green(&self) -> bool {
        self.is_success() && self.exit_ok
    }

    pub fn failed_tests(&self) -> &[FailedTest] {
        match &self.outcome {
            Outcome::TestFailures { tests, .. } => tests,
            _ => &[],
        }
    }
}

/// Classify captured output. See the module docs for the rules.
pub fn classify(text: &str, exit_ok: bool, coverage_requested: bool) -> RunVerdict {
    if !exit_ok && has_build_failure_marker(text) {
        return RunVerdict::build_failure(text);
    }

    let lines: Vec<&str> = text.lines().collect();
    let failures = collect_failures(&lines);

    if !failures.is_empty() {
        let sections = failures
            .iter()
            .map(|failure| extract_section(&lines, failure))
            .collect();
        let tests: Vec<FailedTest> = failures.into_iter().map(|f| f.test).collect();

        return RunVerdict {
            outcome: Outcome::TestFailures {
                count: tests.len(),
                tests,
                sections,
            },
            duration: None,
            coverage: None,
            exit_ok,
        };
    }

    let (duration, coverage) = parse_summary(&lines, coverage_requested);
    RunVerdict {
        outcome: Outcome::Success,
        duration,
        coverage,
        exit_ok,
    }
}

pub fn has_build_failure_marker(text: &str) -> bool {
    BUILD_FAILURE_MARKERS.iter().any(|marker| text.contains(marker))
}

#[derive(Debug)]
struct Failure {
    line: usize,
    test: FailedTest,
}

/// Find every `--- FAIL:` line (subtests included).
///
/// A test is qualified with the package named on the `FAIL <package>`
/// summary line that closes its package block.
fn collect_failures(lines: &[&str]) -> Vec<Failure> {
    let mut failures: Vec<Failure> = Vec::new();
    let mut unqualified: Vec<usize> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        if let Some(rest) = line.trim_start().strip_prefix(FAIL_MARKER) {
            if let Some(name) = rest.split_whitespace().next() {
                unqualified.push(failures.len());
                failures.push(Failure {
                    line: idx,
                    test: FailedTest::new(None, name),
                });
            }
        } else if let Some(package) = package_summary(line, "FAIL") {
            for i in unqualified.drain(..) {
                failures[i].test.package = Some(package.to_string());
            }
        }
    }

    failures
}

/// The package of a top-level `FAIL <pkg> ...` / `ok <pkg> ...` line.
fn package_summary<'a>(line: &'a str, status: &str) -> Option<&'a str> {
    let mut fields = line.split_whitespace();
    if !line.starts_with(status) || fields.next()? != status {
        return None;
    }
    fields.next()
}

fn is_test_marker(line: &str) -> bool {
    line.trim_start().starts_with(TEST_MARKER_PREFIX)
}

fn is_run_marker_for(line: &str, name: &str) -> bool {
    line.trim_start()
        .strip_prefix(RUN_MARKER)
        .and_then(|rest| rest.split_whitespace().next())
        .is_some_and(|run_name| run_name == name)
}

fn is_top_level_result(line: &str) -> bool {
    line == "PASS"
        || line == "FAIL"
        || package_summary(line, "ok").is_some()
        || package_summary(line, "FAIL").is_some()
}

/// The block of output that belongs to one failing test.
///
/// Starts at the test's `=== RUN` line and runs until the next test marker,
/// a blank line, or a top-level result line. When that block does not reach
/// the `--- FAIL:` line itself (a parent whose subtests ran in between), or
/// there is no `=== RUN` line at all, the marker line and its indented
/// detail lines are appended.
fn extract_section(lines: &[&str], failure: &Failure) -> String {
    let mut section: Vec<&str> = Vec::new();
    let mut covered_marker = false;

    let start = lines[..failure.line]
        .iter()
        .rposition(|line| is_run_marker_for(line, &failure.test.name));

    if let Some(start) = start {
        section.push(lines[start]);
        for (offset, line) in lines[start + 1..].iter().enumerate() {
            if line.trim().is_empty() || is_test_marker(line) || is_top_level_result(line) {
                break;
            }
            if start + 1 + offset == failure.line {
                covered_marker = true;
            }
            section.push(line);
        }
    }

    if !covered_marker {
        section.push(lines[failure.line]);
        let marker_indent = indent_of(lines[failure.line]);
        for line in &lines[failure.line + 1..] {
            let detail = indent_of(line) > marker_indent
                && !line.trim_start().starts_with("--- ")
                && !line.trim().is_empty();
            if !detail {
                break;
            }
            section.push(line);
        }
    }

    section.join("\n")
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Duration and coverage from the `ok` summary lines.
fn parse_summary(lines: &[&str], coverage_requested: bool) -> (Option<String>, Option<String>) {
    let mut duration = None;
    let mut coverage = None;

    let summary = lines.iter().find(|line| {
        package_summary(line, "ok").is_some() && line.split_whitespace().count() >= 3
    });

    if let Some(line) = summary {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let raw = fields[2].replace("(cached)", "");
        let raw = raw.trim();
        if raw.starts_with(|c: char| c.is_ascii_digit()) {
            duration = Some(raw.to_string());
        }
        if coverage_requested {
            coverage = percentage_token(line);
        }
    }

    if coverage_requested && coverage.is_none() {
        coverage = lines
            .iter()
            .find(|line| line.contains("coverage"))
            .and_then(|line| percentage_token(line).or_else(|| coverage_phrase(line)));
    }

    (duration, coverage)
}

fn percentage_token(line: &str) -> Option<String> {
    line.split_whitespace()
        .find(|field| field.ends_with('%') && field.starts_with(|c: char| c.is_ascii_digit()))
        .map(str::to_string)
}

fn coverage_phrase(line: &str) -> Option<String> {
    let start = line.find("coverage")?;
    let phrase = line[start..].trim();
    (!phrase.is_empty()).then(|| phrase.to_string())
}
