//! Platform services for GitHub and CircleCI
//!
//! The merge queue only talks to these traits, so tests substitute fakes and
//! the real clients are constructed once by the CLI.

mod circleci;
mod detection;
mod github;

pub use circleci::{CIRCLECI_API_URL, CircleCiService};
pub use detection::{find_pull_request_link, parse_pull_request_number, parse_repo_slug};
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{
    CheckRun, CommitStatus, MergeMethod, MergeResult, Pipeline, PullRequestStatus, Workflow,
};
use async_trait::async_trait;

/// Pull request operations needed to drive a PR to merged
#[async_trait]
pub trait PullRequestService: Send + Sync {
    /// Fetch the current merge status of a PR
    ///
    /// GitHub computes `mergeable_state` in the background, so consecutive
    /// calls may return different states for an untouched PR.
    async fn fetch_pull_request(&self, pr_number: u64) -> Result<PullRequestStatus>;

    /// List check runs reported for a commit
    async fn list_check_runs(&self, head_sha: &str) -> Result<Vec<CheckRun>>;

    /// List the legacy commit status history at `statuses_url`
    async fn list_statuses(&self, statuses_url: &str) -> Result<Vec<CommitStatus>>;

    /// Bring the PR branch up to date with its base branch
    async fn update_branch(&self, pr_number: u64) -> Result<()>;

    /// Merge a PR with the specified method
    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<MergeResult>;

    /// Create a comment on a PR
    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()>;
}

/// CI pipeline queries used by the pipeline gate
#[async_trait]
pub trait PipelineService: Send + Sync {
    /// Most recent pipelines for a project branch, newest first
    async fn list_pipelines(&self, project_slug: &str, branch: &str) -> Result<Vec<Pipeline>>;

    /// Workflows of a pipeline
    async fn list_workflows(&self, pipeline_id: &str) -> Result<Vec<Workflow>>;
}
