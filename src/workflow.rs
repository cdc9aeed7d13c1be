//! Release workflow
//!
//! Wraps the queue drainer with what a release run needs around it:
//! admitting issues from a manifest, moving failed issues back in the
//! tracker, and grouping failures by the person to notify.

use crate::config::ReleaseConfig;
use crate::error::{Error, IssueError, IssueErrorKind, Result};
use crate::merge::{DrainReport, QueueDrainer};
use crate::platform::find_pull_request_link;
use crate::queue::IssueQueue;
use crate::tracker::IssueTracker;
use crate::types::Issue;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Custom field holding the pull request link when the description has none
pub const PULL_REQUEST_FIELD: &str = "Pull Request";

/// Issues sorted at admission
#[derive(Debug, Default)]
pub struct Admission {
    /// Issues to release, in manifest order
    pub queue: IssueQueue,
    /// Issues not in the ready status
    pub rejected: Vec<IssueError>,
    /// Ready issues left out by `max_task_count`
    pub deferred: Vec<Issue>,
}

/// Sort manifest issues into the release queue
///
/// A missing `pull_request` is filled from the description, then from the
/// `Pull Request` custom field. An issue without any link is still admitted
/// and fails later without touching GitHub.
pub fn admit_issues(
    issues: Vec<Issue>,
    ready_status: &str,
    max_task_count: Option<usize>,
) -> Admission {
    let mut admission = Admission::default();

    for mut issue in issues {
        if !issue.status.eq_ignore_ascii_case(ready_status) {
            debug!(issue_id = %issue.id, status = %issue.status, "issue not ready");
            admission
                .rejected
                .push(IssueError::for_issue(IssueErrorKind::StatusNotReady, &issue));
            continue;
        }

        if max_task_count.is_some_and(|max| admission.queue.len() >= max) {
            admission.deferred.push(issue);
            continue;
        }

        if issue.pull_request.is_none() {
            issue.pull_request = find_pull_request_link(&issue.description)
                .or_else(|| issue.custom_field(PULL_REQUEST_FIELD).map(str::to_string));
        }

        info!(issue_id = %issue.id, title = %issue.title, "adding issue to the release queue");
        admission.queue.enqueue(issue);
    }

    admission
}

/// Failures keyed by assignee email, plus those nobody can be told about
#[derive(Debug, Default)]
pub struct FailureGroups {
    /// Failures per assignee email
    pub by_assignee: BTreeMap<String, Vec<IssueError>>,
    /// Failures whose first assignee is missing or has no email
    pub unnotifiable: Vec<IssueError>,
}

/// Group failures by the email of the issue's first assignee
pub fn failures_by_assignee<'e>(
    failures: impl IntoIterator<Item = &'e IssueError>,
) -> FailureGroups {
    let mut groups = FailureGroups::default();
    for failure in failures {
        match failure.assignee().and_then(|a| a.email.as_deref()) {
            Some(email) => groups
                .by_assignee
                .entry(email.to_string())
                .or_default()
                .push(failure.clone()),
            None => {
                let title = failure.issue.as_ref().map_or("unknown issue", |i| i.title.as_str());
                warn!(title, "unable to notify assignee of failed issue");
                groups.unnotifiable.push(failure.clone());
            }
        }
    }
    groups
}

/// Everything a release run produced
#[derive(Debug, Default)]
pub struct ReleaseSummary {
    /// Number of issues put in the queue
    pub admitted: usize,
    /// Issues refused at admission
    pub rejected: Vec<IssueError>,
    /// Ready issues left for a later run
    pub deferred: Vec<Issue>,
    /// Drain outcome
    pub report: DrainReport,
    /// Admission and merge failures grouped for notification
    pub failures: FailureGroups,
}

impl ReleaseSummary {
    /// Whether the release was stopped by a failed workflow
    pub const fn is_aborted(&self) -> bool {
        self.report.is_aborted()
    }

    /// Every classified failure: rejections, merge failures, the abort
    pub fn all_failures(&self) -> impl Iterator<Item = &IssueError> {
        self.rejected
            .iter()
            .chain(&self.report.failed)
            .chain(&self.report.aborted)
    }
}

/// One release run over a batch of manifest issues
pub struct ReleaseWorkflow<'a> {
    config: &'a ReleaseConfig,
    tracker: &'a dyn IssueTracker,
}

impl<'a> ReleaseWorkflow<'a> {
    /// Create a workflow using `config` for statuses and limits
    pub fn new(config: &'a ReleaseConfig, tracker: &'a dyn IssueTracker) -> Self {
        Self { config, tracker }
    }

    /// Admit issues according to the configured ready status and cap
    pub fn admit(&self, issues: Vec<Issue>) -> Admission {
        admit_issues(
            issues,
            &self.config.statuses.ready,
            self.config.max_task_count,
        )
    }

    /// Admit, drain, move failed issues back and group failures
    pub async fn run(&self, issues: Vec<Issue>, drainer: &mut QueueDrainer<'_>) -> ReleaseSummary {
        let admission = self.admit(issues);
        self.release(admission, drainer).await
    }

    /// Drain already admitted issues, then handle their failures
    pub async fn release(
        &self,
        admission: Admission,
        drainer: &mut QueueDrainer<'_>,
    ) -> ReleaseSummary {
        let Admission {
            mut queue,
            rejected,
            deferred,
        } = admission;
        let admitted = queue.len();

        if admitted == 0 {
            warn!(
                ready = %self.config.statuses.ready,
                "no issues found to be merged"
            );
        } else {
            info!(admitted, "release will start merging issues");
        }

        let report = drainer.drain(&mut queue).await;

        for failure in &report.failed {
            let Some(issue) = &failure.issue else {
                continue;
            };
            if let Err(e) = self
                .tracker
                .update_status(&issue.id, &self.config.statuses.failed)
                .await
            {
                warn!(issue_id = %issue.id, error = %e, "failed to move issue back");
            }
        }

        let failures = failures_by_assignee(rejected.iter().chain(&report.failed));

        ReleaseSummary {
            admitted,
            rejected,
            deferred,
            report,
            failures,
        }
    }
}

/// Manifest layouts: a bare array or `{ "issues": [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum Manifest {
    List(Vec<Issue>),
    Wrapped { issues: Vec<Issue> },
}

/// Parse a JSON issue manifest
pub fn parse_manifest(content: &str) -> Result<Vec<Issue>> {
    let manifest: Manifest = serde_json::from_str(content)
        .map_err(|e| Error::Manifest(format!("invalid issue manifest: {e}")))?;
    Ok(match manifest {
        Manifest::List(issues) | Manifest::Wrapped { issues } => issues,
    })
}

/// Read a JSON issue manifest from disk
pub fn load_manifest(path: &Path) -> Result<Vec<Issue>> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Manifest(format!("failed to read {}: {e}", path.display())))?;
    let issues = parse_manifest(&content)?;
    debug!(path = %path.display(), count = issues.len(), "loaded issue manifest");
    Ok(issues)
}
