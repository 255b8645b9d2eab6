// src/engine/mod.rs

//! Orchestration engine for testwatch.
//!
//! This module ties together:
//! - the change aggregator (trailing debounce over pending paths, plus the
//!   failed-test memory)
//! - the scope resolver (changed paths → which packages to test)
//! - the stop handle used for graceful shutdown
//! - the runtime loop that reacts to:
//!   - change notifications and watch errors
//!   - debounced batches
//!   - stop requests
//!
//! Dispatch is single-threaded: the runtime awaits each test run before it
//! looks at the next input, so runs never overlap.

pub mod aggregator;
pub mod runtime;
pub mod scope;
pub mod stop;

pub use aggregator::{ChangeAggregator, ChangeBatch, DEFAULT_DEBOUNCE};
pub use runtime::{Runtime, SessionSettings};
pub use scope::ScopeResolver;
pub use stop::{stop_channel, stop_on_signals, StopHandle, StopSignal};
