//! release-bot - release merge queue
//!
//! Merges a batch of approved pull requests one at a time, waiting for
//! GitHub's mergeability checks, and stops the whole batch as soon as the
//! release pipeline it has been watching fails.
//!
//! # Layers
//!
//! - [`queue`]: ordered, deduplicated issues awaiting merge
//! - [`merge`]: per-PR state machine and the sequential queue drainer
//! - [`pipeline`]: gate over the shared CircleCI release workflow
//! - [`workflow`]: admission, tracker updates and failure grouping around a drain
//! - [`platform`]: GitHub and CircleCI services behind traits

pub mod auth;
pub mod checks;
pub mod clock;
pub mod config;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod platform;
pub mod progress;
pub mod queue;
pub mod tracker;
pub mod types;
pub mod workflow;

pub use error::{Error, IssueError, IssueErrorKind, Result};
