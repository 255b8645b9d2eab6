// src/watch/registry.rs

//! Startup directory discovery.
//!
//! Watching is directory-granular: every non-hidden directory under the root
//! is registered once, at startup. Files created later inside a registered
//! directory are observed; directories created later are not.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::source::NotificationSource;

/// The set of directories under surveillance for this session.
#[derive(Debug, Clone)]
pub struct WatchRegistry {
    root: PathBuf,
    targets: BTreeSet<PathBuf>,
}

impl WatchRegistry {
    /// Walk `root` and register every discovered directory with `source`.
    ///
    /// The first failing `add` aborts the walk and is returned.
    pub fn seed(
        fs: &dyn FileSystem,
        root: &Path,
        source: &mut NotificationSource,
    ) -> Result<Self> {
        let dirs = discover_directories(fs, root)?;
        for dir in &dirs {
            source.add(dir)?;
        }

        info!(root = ?root, directories = dirs.len(), "watch directories registered");

        Ok(Self {
            root: root.to_path_buf(),
            targets: dirs.into_iter().collect(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn targets(&self) -> impl Iterator<Item = &Path> {
        self.targets.iter().map(PathBuf::as_path)
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.targets.contains(dir)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Every directory under `root` (including `root`), skipping hidden ones
/// and everything beneath them. Symlinked directories are not followed.
/// Sorted.
pub fn discover_directories(fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = vec![root.to_path_buf()];
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_symlink(&path) || !fs.is_dir(&path) {
                continue;
            }
            if is_hidden(&path) {
                debug!(?path, "skipping hidden directory");
                continue;
            }
            dirs.push(path.clone());
            stack.push(path);
        }
    }

    dirs.sort();
    Ok(dirs)
}

/// Whether the final path component starts with `.`.
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}
