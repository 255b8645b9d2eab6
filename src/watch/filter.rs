// src/watch/filter.rs

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use globset::{Glob, GlobMatcher};

use crate::errors::{Result, TestwatchError};

type Predicate = dyn Fn(&Path) -> bool + Send + Sync;

/// Decides whether a changed path is a relevant source file.
#[derive(Clone)]
pub struct FileFilter {
    description: String,
    predicate: Arc<Predicate>,
}

impl fmt::Debug for FileFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileFilter")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::go_sources()
    }
}

impl FileFilter {
    /// Paths with a `.go` extension.
    pub fn go_sources() -> Self {
        Self::from_fn("*.go", |path| {
            path.extension().is_some_and(|ext| ext == "go")
        })
    }

    /// Match a glob (e.g. `"*_test.go"`) against the file name only.
    pub fn glob(pattern: &str) -> Result<Self> {
        let matcher: GlobMatcher = Glob::new(pattern)
            .map_err(|e| {
                TestwatchError::ConfigError(format!("invalid file filter {pattern:?}: {e}"))
            })?
            .compile_matcher();

        Ok(Self::from_fn(pattern, move |path| {
            path.file_name()
                .is_some_and(|name| matcher.is_match(Path::new(name)))
        }))
    }

    /// Wrap an arbitrary predicate.
    pub fn from_fn<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        (self.predicate)(path)
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}
