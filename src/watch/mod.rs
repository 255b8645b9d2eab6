// src/watch/mod.rs

//! What gets watched, and which changes matter.
//!
//! This module is responsible for:
//! - Discovering the directories to register with the notification source
//!   (a one-time walk that skips hidden directories).
//! - The file filter deciding which changed paths are relevant sources.
//! - Relating event paths back to the watch root.
//!
//! It does **not** decide when or what to test; that is the engine's job.

pub mod filter;
pub mod path_utils;
pub mod registry;

pub use filter::FileFilter;
pub use path_utils::relative_str;
pub use registry::{discover_directories, is_hidden, WatchRegistry};
