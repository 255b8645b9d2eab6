// src/engine/scope.rs

//! Changed paths → test scope.
//!
//! Scope units are directories relative to the watch root; there is no
//! import-graph traversal. Whenever the answer is not a single unit the
//! resolver falls back to testing everything.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::fs::FileSystem;
use crate::types::{FailedTestSet, TestScope};
use crate::watch::path_utils::relative_dir;

#[derive(Debug, Clone)]
pub struct ScopeResolver {
    root: PathBuf,
    /// Module path from `go.mod`, used to map package import paths back to
    /// directories.
    module: Option<String>,
}

impl ScopeResolver {
    pub fn new(root: impl Into<PathBuf>, module: Option<String>) -> Self {
        Self {
            root: root.into(),
            module,
        }
    }

    /// Build a resolver for `root`, reading the module path from
    /// `root/go.mod` if there is one.
    pub fn detect(fs: &dyn FileSystem, root: &Path) -> Self {
        let go_mod = root.join("go.mod");
        let module = fs
            .read_to_string(&go_mod)
            .ok()
            .and_then(|text| module_path(&text));
        debug!(root = ?root, ?module, "scope resolver ready");
        Self::new(root, module)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Decide what to test for `changed`, taking remembered failures into
    /// account.
    pub fn resolve(&self, changed: &[PathBuf], failed: &FailedTestSet) -> TestScope {
        if changed.is_empty() && failed.is_empty() {
            return TestScope::All;
        }

        let mut units = BTreeSet::new();

        for path in changed {
            match relative_dir(&self.root, path) {
                Some(unit) => {
                    units.insert(unit);
                }
                None => {
                    debug!(path = ?path, "changed path outside the watch root; testing everything");
                    return TestScope::All;
                }
            }
        }

        for test in failed.iter() {
            match test.package.as_deref().and_then(|pkg| self.package_dir(pkg)) {
                Some(unit) => {
                    units.insert(unit);
                }
                None => {
                    debug!(test = %test, "cannot place failed test in a directory; testing everything");
                    return TestScope::All;
                }
            }
        }

        let mut iter = units.into_iter();
        match (iter.next(), iter.next()) {
            (Some(unit), None) => TestScope::Packages(vec![unit]),
            _ => TestScope::All,
        }
    }

    /// Directory (relative to the root) holding package `package`.
    pub fn package_dir(&self, package: &str) -> Option<String> {
        let rel = match &self.module {
            Some(module) if package == module => return Some(".".to_string()),
            Some(module) => package.strip_prefix(module.as_str())?.strip_prefix('/')?,
            None => package,
        };
        clean_relative(rel)
    }
}

/// The `module` directive of a `go.mod` file.
pub fn module_path(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let name = rest.trim().trim_matches('"');
        (!name.is_empty()).then(|| name.to_string())
    })
}

/// `rel` as a normalized relative directory, or `None` if it escapes the
/// root or is absolute.
fn clean_relative(rel: &str) -> Option<String> {
    let mut parts = Vec::new();
    for component in Path::new(rel).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?.to_string()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        Some(".".to_string())
    } else {
        Some(parts.join("/"))
    }
}
