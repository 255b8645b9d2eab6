// src/exec/mod.rs

//! Test command execution.
//!
//! - [`command`] turns a resolved scope into the test command's arguments.
//! - [`backend`] provides the `TestRunner` trait and `GoTestRunner`, which
//!   runs the command with `tokio::process::Command` and captures its
//!   combined output. Tests swap in a fake runner.
//! - [`focus`] derives a `-run` filter from a single changed test file.

pub mod backend;
pub mod command;
pub mod focus;

pub use backend::{GoTestRunner, RunOutput, TestRunner};
pub use command::TestInvocation;
pub use focus::{focused_run_filter, is_test_file, test_names_in};
