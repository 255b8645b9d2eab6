// src/exec/focus.rs

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::fs::FileSystem;

/// Whether `path` is a Go test file (`*_test.go`).
pub fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with("_test.go"))
}

/// Names of the top-level `func TestXxx(` declarations in `source`.
///
/// `TestMain` is skipped; it is a harness hook, not a test.
pub fn test_names_in(source: &str) -> Vec<String> {
    let Ok(re) = Regex::new(r"(?m)^func\s+(Test[A-Za-z0-9_]*)\s*\(") else {
        return Vec::new();
    };

    re.captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| name != "TestMain")
        .collect()
}

/// A `-run` pattern covering the tests declared in the single changed file,
/// when the batch is exactly one `_test.go` file that declares tests.
pub fn focused_run_filter(fs: &dyn FileSystem, changed: &[PathBuf]) -> Option<String> {
    let [path] = changed else {
        return None;
    };
    if !is_test_file(path) {
        return None;
    }

    let source = match fs.read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            debug!(?path, error = %err, "could not read test file; running the whole package");
            return None;
        }
    };

    let names = test_names_in(&source);
    if names.is_empty() {
        return None;
    }

    Some(format!("^({})$", names.join("|")))
}
