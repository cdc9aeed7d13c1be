//! Issue tracker seam
//!
//! Only status updates are needed by the merge queue. Real tracker adapters
//! live outside this crate; [`LoggingTracker`] records the transitions in
//! the log so a run without a tracker still shows what would have changed.

use crate::error::Result;
use async_trait::async_trait;
use tracing::info;

/// Status label for issues merged by the release
pub const DEFAULT_MERGED_STATUS: &str = "Merged - Release";

/// Status label issues must carry to be admitted
pub const DEFAULT_READY_STATUS: &str = "Ready - Release";

/// Status label failed issues are moved back to
pub const DEFAULT_FAILED_STATUS: &str = "In Progress - Dev";

/// Issue tracker operations used by the release
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Move an issue to a new status
    async fn update_status(&self, issue_id: &str, status: &str) -> Result<()>;
}

/// Tracker that only logs status transitions
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTracker;

#[async_trait]
impl IssueTracker for LoggingTracker {
    async fn update_status(&self, issue_id: &str, status: &str) -> Result<()> {
        info!(issue_id, status, "issue status updated");
        Ok(())
    }
}
