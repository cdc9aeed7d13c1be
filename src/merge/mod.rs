//! Merge engine for release batches
//!
//! Two layers:
//! 1. Machine - drive one pull request to merged, polling its mergeable state
//! 2. Drain - merge a queue of issues one at a time, with settle delays and
//!    the pipeline gate between merges

mod drain;
mod machine;

pub use drain::{DrainOptions, DrainReport, QueueDrainer};
pub use machine::{MERGED_COMMENT, MergeSettings, UPDATED_BRANCH_COMMENT, merge_pull_request};
