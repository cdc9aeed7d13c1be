//! Core types for release-bot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of an issue in the tracker (opaque)
pub type IssueId = String;

/// A person assigned to an issue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignee {
    /// Tracker user ID
    pub id: u64,
    /// Display name
    pub name: String,
    /// Email, used to find the person to notify
    #[serde(default)]
    pub email: Option<String>,
}

/// A custom field attached to an issue by the tracker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomField {
    /// Field ID
    pub id: String,
    /// Field name (e.g., "Pull Request")
    pub name: String,
    /// Field value, if set
    #[serde(default)]
    pub value: Option<String>,
}

/// A release checklist item carrying a reference to one pull request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    /// Tracker ID
    pub id: IssueId,
    /// Issue title
    pub title: String,
    /// Free-form description, may contain the pull request link
    #[serde(default)]
    pub description: String,
    /// Current status label
    pub status: String,
    /// Assignees
    #[serde(default)]
    pub assignees: Vec<Assignee>,
    /// Pull request URL
    #[serde(default)]
    pub pull_request: Option<String>,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Custom fields
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

impl Issue {
    /// Create an issue with only the fields the merge queue needs
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: status.into(),
            assignees: Vec::new(),
            pull_request: None,
            tags: Vec::new(),
            custom_fields: Vec::new(),
        }
    }

    /// Set the pull request URL
    #[must_use]
    pub fn with_pull_request(mut self, url: impl Into<String>) -> Self {
        self.pull_request = Some(url.into());
        self
    }

    /// Add an assignee
    #[must_use]
    pub fn with_assignee(mut self, assignee: Assignee) -> Self {
        self.assignees.push(assignee);
        self
    }

    /// Value of the custom field with the given name, if set and non-empty
    pub fn custom_field(&self, name: &str) -> Option<&str> {
        self.custom_fields
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.value.as_deref())
            .filter(|v| !v.is_empty())
    }
}

// =============================================================================
// Pull request types
// =============================================================================

/// GitHub's computed readiness of a pull request to merge
///
/// GitHub computes this lazily, so a freshly touched PR reports `Unknown`
/// until the background job finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeableState {
    /// Not computed yet
    Unknown,
    /// Head branch is behind the base branch
    Behind,
    /// Mergeable, but non-required checks are pending or failing
    Unstable,
    /// Blocked by branch protection (reviews, required checks)
    Blocked,
    /// Merge conflicts
    Dirty,
    /// Ready to merge
    Clean,
    /// Draft pull request
    Draft,
    /// Mergeable with passing commit status and pre-receive hooks
    HasHooks,
    /// Anything GitHub adds later
    #[serde(other)]
    Other,
}

impl MergeableState {
    /// States the merge state machine keeps polling on
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Unknown | Self::Behind | Self::Unstable)
    }
}

impl std::fmt::Display for MergeableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Behind => "behind",
            Self::Unstable => "unstable",
            Self::Blocked => "blocked",
            Self::Dirty => "dirty",
            Self::Clean => "clean",
            Self::Draft => "draft",
            Self::HasHooks => "has_hooks",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// Snapshot of a pull request's merge status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestStatus {
    /// PR number
    pub number: u64,
    /// Reported mergeable state
    pub mergeable_state: MergeableState,
    /// Whether GitHub considers the PR mergeable (None = still computing)
    pub mergeable: Option<bool>,
    /// Whether the PR was already merged
    pub merged: bool,
    /// SHA of the head commit, used to list check runs
    pub head_sha: String,
    /// URL listing legacy commit statuses for the head commit
    pub statuses_url: String,
}

/// Lifecycle of a check run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunStatus {
    /// Waiting for a runner
    Queued,
    /// Running
    InProgress,
    /// Finished, see the conclusion
    Completed,
    /// Waiting, requested, pending, ...
    #[serde(other)]
    Other,
}

/// Result of a completed check run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckConclusion {
    /// Passed
    Success,
    /// Failed
    Failure,
    /// Neutral
    Neutral,
    /// Skipped
    Skipped,
    /// Cancelled
    Cancelled,
    /// Timed out
    TimedOut,
    /// Needs manual action
    ActionRequired,
    /// Anything else
    #[serde(other)]
    Other,
}

/// A check run (GitHub Checks API) on the head commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    /// Check name
    pub name: String,
    /// Lifecycle status
    pub status: CheckRunStatus,
    /// Conclusion, once completed
    pub conclusion: Option<CheckConclusion>,
}

/// State of a legacy commit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitState {
    /// Still running
    Pending,
    /// Passed
    Success,
    /// Failed
    Failure,
    /// Errored
    Error,
    /// Anything else
    #[serde(other)]
    Other,
}

/// One report in a commit's status history (GitHub Status API)
///
/// GitHub returns every report ever made, so the same context appears
/// several times; only the newest report per context is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    /// Status context (the check name)
    pub context: String,
    /// Reported state
    pub state: CommitState,
    /// When the report was made
    pub reported_at: DateTime<Utc>,
}

/// Result of a merge operation
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// Whether the merge was successful
    pub merged: bool,
    /// The SHA of the merge commit (if successful)
    pub sha: Option<String>,
    /// Message from the merge operation (especially on failure)
    pub message: Option<String>,
}

/// Merge method sent to GitHub; releases are always squashed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMethod {
    /// Squash all commits into one
    Squash,
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Squash => write!(f, "squash"),
        }
    }
}

// =============================================================================
// CI pipeline types
// =============================================================================

/// One run of the CI system for a branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Pipeline ID
    pub id: String,
    /// Sequential pipeline number
    #[serde(default)]
    pub number: u64,
    /// Pipeline state (created, errored, ...)
    #[serde(default)]
    pub state: String,
    /// When the pipeline was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Status of a workflow inside a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Running
    Running,
    /// Failed
    Failed,
    /// Passed
    Success,
    /// Not run
    NotRun,
    /// Errored
    Error,
    /// A job failed, others still running
    Failing,
    /// Waiting on an approval job
    OnHold,
    /// Cancelled
    Canceled,
    /// Anything else
    #[serde(other)]
    Other,
}

/// A named workflow inside a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    /// Workflow ID
    pub id: String,
    /// Workflow name (e.g., "release_staging")
    pub name: String,
    /// Current status
    pub status: WorkflowStatus,
}
