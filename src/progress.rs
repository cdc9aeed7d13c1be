//! Progress reporting for long-running merge queues
//!
//! The queue drainer spends most of its time waiting. Reporting goes through
//! this trait so the CLI can render it while tests stay silent.

use crate::error::IssueError;
use crate::types::Issue;
use async_trait::async_trait;

/// Receives human-facing progress while the queue drains
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Free-form status line
    async fn on_message(&self, message: &str);

    /// An issue was merged and passed the pipeline gate
    async fn on_merged(&self, issue: &Issue);

    /// An issue failed with a classified error
    async fn on_failed(&self, error: &IssueError);
}

/// Progress sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_message(&self, _message: &str) {}

    async fn on_merged(&self, _issue: &Issue) {}

    async fn on_failed(&self, _error: &IssueError) {}
}
