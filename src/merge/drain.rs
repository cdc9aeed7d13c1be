//! Queue drainer - merge a batch of issues one at a time
//!
//! Merges are strictly sequential: each merge is followed by a settle delay
//! and a pipeline check, so a pipeline failure can be attributed to the merge
//! that preceded it. A failed workflow aborts the batch; every other
//! classified failure is recorded and the next issue is attempted.

use crate::clock::Sleeper;
use crate::error::{Error, IssueError, IssueErrorKind, Result};
use crate::merge::machine::{MergeSettings, merge_pull_request};
use crate::pipeline::PipelineGate;
use crate::platform::{PullRequestService, parse_pull_request_number};
use crate::progress::{NoopProgress, ProgressCallback};
use crate::queue::IssueQueue;
use crate::tracker::{DEFAULT_MERGED_STATUS, IssueTracker};
use crate::types::Issue;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Delays and tracker status used between merges
#[derive(Debug, Clone)]
pub struct DrainOptions {
    /// Wait after the first merge of the batch
    pub first_merge_delay: Duration,
    /// Wait after every later merge
    pub merge_delay: Duration,
    /// Tracker status set on merged issues
    pub merged_status: String,
}

impl Default for DrainOptions {
    fn default() -> Self {
        Self {
            first_merge_delay: Duration::from_secs(5 * 60),
            merge_delay: Duration::from_secs(2 * 60),
            merged_status: DEFAULT_MERGED_STATUS.to_string(),
        }
    }
}

/// Outcome of draining a queue
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Issues merged and past the pipeline gate, in merge order
    pub merged: Vec<Issue>,
    /// Classified per-issue failures, bound to their issues
    pub failed: Vec<IssueError>,
    /// The failed-workflow error that stopped the batch, if any
    pub aborted: Option<IssueError>,
    /// Issues dropped after an unclassified error
    pub dropped: Vec<Issue>,
}

impl DrainReport {
    /// Whether the batch was stopped by a failed release workflow
    pub const fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    /// Number of issues that were attempted
    pub fn attempted(&self) -> usize {
        self.merged.len()
            + self.failed.len()
            + self.dropped.len()
            + usize::from(self.aborted.is_some())
    }
}

/// Drains an [`IssueQueue`] through the merge state machine
pub struct QueueDrainer<'a> {
    pulls: &'a dyn PullRequestService,
    tracker: &'a dyn IssueTracker,
    sleeper: &'a dyn Sleeper,
    progress: &'a dyn ProgressCallback,
    gate: Option<PipelineGate<'a>>,
    merge_settings: &'a MergeSettings,
    options: &'a DrainOptions,
}

impl<'a> QueueDrainer<'a> {
    /// Create a drainer without a pipeline gate and without progress output
    pub fn new(
        pulls: &'a dyn PullRequestService,
        tracker: &'a dyn IssueTracker,
        sleeper: &'a dyn Sleeper,
        merge_settings: &'a MergeSettings,
        options: &'a DrainOptions,
    ) -> Self {
        Self {
            pulls,
            tracker,
            sleeper,
            progress: &NoopProgress,
            gate: None,
            merge_settings,
            options,
        }
    }

    /// Check the release pipeline after every merge
    #[must_use]
    pub fn with_gate(mut self, gate: PipelineGate<'a>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Report progress to `progress`
    #[must_use]
    pub fn with_progress(mut self, progress: &'a dyn ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    /// The pipeline gate, if checks are enabled
    pub const fn gate(&self) -> Option<&PipelineGate<'a>> {
        self.gate.as_ref()
    }

    /// Merge every queued issue, head first
    ///
    /// Stops early only on a failed release workflow; the issues still
    /// queued at that point are left in `queue`.
    pub async fn drain(&mut self, queue: &mut IssueQueue) -> DrainReport {
        // Pipelines to inspect scale with the batch: one new pipeline per merge
        let batch_size = queue.len();
        let mut report = DrainReport::default();
        let mut first_merge = true;

        info!(batch_size, "draining merge queue");

        while let Some(issue) = queue.dequeue() {
            match self.merge_issue(&issue, batch_size, &mut first_merge).await {
                Ok(()) => {
                    info!(issue_id = %issue.id, title = %issue.title, "issue merged");
                    self.progress.on_merged(&issue).await;
                    report.merged.push(issue);
                }
                Err(Error::Issue(e)) => {
                    let e = e.bind(&issue);
                    if e.kind.is_fatal() {
                        error!(
                            issue_id = %issue.id,
                            remaining = queue.len(),
                            "release workflow failed, stopping the release"
                        );
                        let message = format!(
                            "Release workflow has failed after merging {}, stopping immediately",
                            issue.title
                        );
                        self.progress.on_message(&message).await;
                        report.aborted = Some(e);
                        break;
                    }
                    warn!(issue_id = %issue.id, reason = %e, "unable to merge issue");
                    self.progress.on_failed(&e).await;
                    report.failed.push(e);
                }
                Err(e) => {
                    warn!(issue_id = %issue.id, error = %e, "unexpected error, dropping issue");
                    self.progress
                        .on_message(&format!("Unable to merge {}: {e}", issue.title))
                        .await;
                    report.dropped.push(issue);
                }
            }
        }

        report
    }

    async fn merge_issue(
        &mut self,
        issue: &Issue,
        batch_size: usize,
        first_merge: &mut bool,
    ) -> Result<()> {
        let Some(pr_number) = issue
            .pull_request
            .as_deref()
            .and_then(parse_pull_request_number)
        else {
            return Err(IssueError::new(IssueErrorKind::NeedsPullRequest).into());
        };

        self.progress
            .on_message(&format!("Merging {} (PR #{pr_number})...", issue.title))
            .await;
        merge_pull_request(pr_number, self.pulls, self.sleeper, self.merge_settings).await?;

        // The PR is merged at this point; a stale tracker status is not worth failing over
        if let Err(e) = self
            .tracker
            .update_status(&issue.id, &self.options.merged_status)
            .await
        {
            warn!(issue_id = %issue.id, error = %e, "failed to update issue status");
        }

        let delay = if *first_merge {
            *first_merge = false;
            self.options.first_merge_delay
        } else {
            self.options.merge_delay
        };
        self.progress
            .on_message(&format!(
                "Waiting {}s for the build to settle...",
                delay.as_secs()
            ))
            .await;
        self.sleeper.sleep(delay).await;

        if let Some(gate) = self.gate.as_mut() {
            let target = gate.target();
            self.progress
                .on_message(&format!(
                    "Checking {} pipeline for {} branch...",
                    target.workflow_name, target.branch
                ))
                .await;
            gate.check_pipeline_status(batch_size).await?;
        } else {
            debug!("pipeline checks disabled, skipping");
        }

        Ok(())
    }
}
