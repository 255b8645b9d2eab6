#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub use testwatch_test_utils::{init_tracing, with_timeout};

/// Lay out a small Go module on disk:
///
/// ```text
/// go.mod          (module example.com/calc)
/// main.go
/// a/x.go
/// b/y.go
/// .git/HEAD
/// ```
pub fn write_go_module(root: &Path) -> std::io::Result<()> {
    fs::write(root.join("go.mod"), "module example.com/calc\n\ngo 1.22\n")?;
    fs::write(root.join("main.go"), "package main\n\nfunc main() {}\n")?;
    fs::create_dir_all(root.join("a"))?;
    fs::write(root.join("a/x.go"), "package a\n")?;
    fs::create_dir_all(root.join("b"))?;
    fs::write(root.join("b/y.go"), "package b\n")?;
    fs::create_dir_all(root.join(".git"))?;
    fs::write(root.join(".git/HEAD"), "ref: refs/heads/main\n")?;
    Ok(())
}
