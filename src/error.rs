//! Error types for release-bot
//!
//! Two layers of failure exist:
//! - [`IssueError`]: a classified, per-issue outcome (needs approval, failed
//!   checks, ...) that the merge queue records against the issue.
//! - [`Error`]: everything else (network, malformed responses, config), which
//!   the queue logs and drops without classifying.

use crate::types::{Assignee, Issue};
use thiserror::Error;

/// Classified reason an issue could not be merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueErrorKind {
    /// The pull request was merged before the bot got to it
    AlreadyMerged,
    /// The pull request is blocked on review
    NeedsApproval,
    /// Required checks failed or never settled
    FailedChecks,
    /// The release workflow in CI failed after a merge
    FailedWorkflow,
    /// The pull request conflicts with its base branch
    HasMergeConflicts,
    /// The issue carries no usable pull request link
    NeedsPullRequest,
    /// The issue is not in the ready-for-release status
    StatusNotReady,
}

impl IssueErrorKind {
    /// Human-readable explanation, suitable for notifying the assignee
    pub const fn message(self) -> &'static str {
        match self {
            Self::AlreadyMerged => "PR in the card has already been merged.",
            Self::NeedsApproval => "PR requires approval from code owners before merging.",
            Self::FailedChecks => "PR has failed checks that need to be addressed.",
            Self::FailedWorkflow => "The release workflow in CircleCI has failed.",
            Self::HasMergeConflicts => "PR has merge conflicts.",
            Self::NeedsPullRequest => {
                "The card needs to have the pull request link in the description."
            }
            Self::StatusNotReady => "The card status needs to be in Ready.",
        }
    }

    /// Whether this failure stops the whole batch instead of a single issue
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::FailedWorkflow)
    }
}

impl std::fmt::Display for IssueErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// A classified failure, bound to the issue that caused it once known
///
/// The merge state machine raises these without an issue attached (it only
/// knows the pull request number); the queue drainer binds the issue and its
/// assignees before recording the failure.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct IssueError {
    /// What went wrong
    pub kind: IssueErrorKind,
    /// The offending issue
    pub issue: Option<Issue>,
    /// Assignees of the offending issue
    pub assignees: Vec<Assignee>,
}

impl IssueError {
    /// Create an unbound error of the given kind
    pub const fn new(kind: IssueErrorKind) -> Self {
        Self {
            kind,
            issue: None,
            assignees: Vec::new(),
        }
    }

    /// Create an error already bound to an issue
    pub fn for_issue(kind: IssueErrorKind, issue: &Issue) -> Self {
        Self::new(kind).bind(issue)
    }

    /// Attach the issue and its assignees
    #[must_use]
    pub fn bind(mut self, issue: &Issue) -> Self {
        self.assignees.clone_from(&issue.assignees);
        self.issue = Some(issue.clone());
        self
    }

    /// First assignee, the one notified about the failure
    pub fn assignee(&self) -> Option<&Assignee> {
        self.assignees.first()
    }
}

/// Errors that can occur in release-bot
#[derive(Debug, Error)]
pub enum Error {
    /// Classified per-issue failure
    #[error(transparent)]
    Issue(#[from] IssueError),

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// CircleCI API error
    #[error("CircleCI API error: {0}")]
    CircleCiApi(String),

    /// Generic collaborator error
    #[error("platform error: {0}")]
    Platform(String),

    /// Issue tracker error
    #[error("tracker error: {0}")]
    Tracker(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Authentication error
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Issue manifest could not be read
    #[error("manifest error: {0}")]
    Manifest(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Octocrab client error
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),
}

impl Error {
    /// The classified failure, if this is one
    pub const fn as_issue(&self) -> Option<&IssueError> {
        match self {
            Self::Issue(e) => Some(e),
            _ => None,
        }
    }
}

impl From<IssueErrorKind> for Error {
    fn from(kind: IssueErrorKind) -> Self {
        Self::Issue(IssueError::new(kind))
    }
}

/// Result type alias for release-bot operations
pub type Result<T> = std::result::Result<T, Error>;
