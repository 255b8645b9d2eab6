// src/report/format.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::report::classify::{Outcome, RunVerdict};
use crate::watch::relative_str;

/// Status line announcing a run, shown before the test command starts.
pub fn run_announcement(root: &Path, changed: &[PathBuf]) -> String {
    match changed {
        [] => "Running all tests...".to_string(),
        [single] => {
            let shown = relative_str(root, single).unwrap_or_else(|| single.display().to_string());
            format!("{shown} changed. Running tests again.")
        }
        many => format!("{} files changed. Running tests again.", many.len()),
    }
}

/// Lines describing a verdict: the headline first, then any details.
pub fn verdict_lines(verdict: &RunVerdict) -> Vec<String> {
    match &verdict.outcome {
        Outcome::Success => vec![success_headline(verdict)],
        Outcome::TestFailures {
            count,
            tests,
            sections,
        } => {
            let packages: BTreeSet<&str> = tests
                .iter()
                .filter_map(|t| t.package.as_deref())
                .collect();
            let location = if packages.is_empty() {
                "unknown".to_string()
            } else {
                packages.into_iter().collect::<Vec<_>>().join(", ")
            };
            let noun = if *count == 1 { "test" } else { "tests" };

            let mut lines = vec![
                format!("TEST FAILED: {count} {noun} in {location}"),
                String::new(),
                "Failure Details:".to_string(),
            ];
            for section in sections {
                lines.extend(section.lines().map(str::to_string));
                lines.push(String::new());
            }
            lines
        }
        Outcome::BuildFailure(raw) => {
            let mut lines = vec!["BUILD FAILED".to_string(), String::new()];
            lines.extend(raw.trim_end().lines().map(str::to_string));
            lines
        }
    }
}

fn success_headline(verdict: &RunVerdict) -> String {
    let mut headline = "ALL TESTS PASSED".to_string();
    if let Some(duration) = &verdict.duration {
        headline.push_str(&format!(" ({duration})"));
    }
    if let Some(coverage) = &verdict.coverage {
        if coverage.ends_with('%') {
            headline.push_str(&format!(" - {coverage} coverage"));
        } else {
            headline.push_str(&format!(" - {coverage}"));
        }
    }
    if !verdict.exit_ok {
        headline.push_str(" [test command exited with failure status]");
    }
    headline
}
