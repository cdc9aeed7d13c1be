//! Per-pull-request merge state machine
//!
//! GitHub's `mergeable_state` is eventually consistent: it reads `unknown`
//! right after any change, `behind` until the branch is updated, and
//! `unstable` while non-required checks run. The machine polls through those
//! transient states with two independent retry budgets, then validates the
//! final state and squash-merges.

use crate::checks::{SkipPattern, evaluate_checks};
use crate::clock::Sleeper;
use crate::error::{Error, IssueErrorKind, Result};
use crate::platform::PullRequestService;
use crate::types::{MergeMethod, MergeResult, MergeableState};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Comment posted after a successful merge
pub const MERGED_COMMENT: &str = "✨ PR has been merged by the release bot";

/// Comment posted after updating a branch that was behind its base
pub const UPDATED_BRANCH_COMMENT: &str =
    "👌 Pull request has been updated with the base branch by the release bot";

/// Retry limits, delays and policy for merging one pull request
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct MergeSettings {
    /// Maximum refetches while the state is `unknown`
    pub refetch_limit: u32,
    /// Maximum waits for checks while `behind` or `unstable`
    pub checks_limit: u32,
    /// Wait before refetching an `unknown` PR
    pub refetch_timeout: Duration,
    /// Wait for checks to progress
    pub checks_timeout: Duration,
    /// Merge without waiting for pending checks
    pub skip_pending_checks: bool,
    /// Merge despite failing non-required checks
    pub skip_failing_checks: bool,
    /// Merge a `behind` PR as-is when GitHub reports it mergeable
    pub skip_updating_branch: bool,
    /// Checks ignored when evaluating an `unstable` PR
    pub checks_to_skip: Vec<SkipPattern>,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            refetch_limit: 10,
            checks_limit: 120,
            refetch_timeout: Duration::from_secs(5),
            checks_timeout: Duration::from_secs(60),
            skip_pending_checks: false,
            skip_failing_checks: false,
            skip_updating_branch: false,
            checks_to_skip: Vec::new(),
        }
    }
}

/// How the polling loop ended
enum LoopExit {
    /// State settled, or a budget ran out: validate the final state
    Validate,
    /// Policy decided to merge as-is: skip validation
    SkipValidation,
}

/// Drive one PR to merged
///
/// Returns a classified [`IssueErrorKind`] error when the PR cannot be merged
/// (already merged, needs approval, conflicts, failed checks). Any other
/// error comes from the service and is not classified.
pub async fn merge_pull_request(
    pr_number: u64,
    pulls: &dyn PullRequestService,
    sleeper: &dyn Sleeper,
    settings: &MergeSettings,
) -> Result<MergeResult> {
    let mut pr = pulls.fetch_pull_request(pr_number).await?;
    let mut refetches = 0;
    let mut check_waits = 0;
    let mut exit = LoopExit::Validate;

    while pr.mergeable_state.is_transient() {
        if refetches >= settings.refetch_limit || check_waits >= settings.checks_limit {
            warn!(
                pr_number,
                state = %pr.mergeable_state,
                refetches,
                check_waits,
                "retry budget exhausted, validating last reported state"
            );
            break;
        }

        match pr.mergeable_state {
            MergeableState::Unknown => {
                if pr.merged {
                    info!(pr_number, "PR has already been merged");
                    return Err(IssueErrorKind::AlreadyMerged.into());
                }
                info!(pr_number, "mergeable state unknown, refetching");
                sleeper.sleep(settings.refetch_timeout).await;
                refetches += 1;
            }
            MergeableState::Behind => {
                if settings.skip_updating_branch && pr.mergeable == Some(true) {
                    info!(pr_number, "PR is behind but mergeable, skipping branch update");
                    exit = LoopExit::SkipValidation;
                    break;
                }
                info!(pr_number, "PR branch is behind, updating with base branch");
                if let Err(e) = pulls.update_branch(pr_number).await {
                    warn!(pr_number, error = %e, "failed to update PR branch, waiting for checks");
                } else if let Err(e) = pulls
                    .create_pr_comment(pr_number, UPDATED_BRANCH_COMMENT)
                    .await
                {
                    warn!(pr_number, error = %e, "failed to comment on branch update");
                }
                sleeper.sleep(settings.checks_timeout).await;
                check_waits += 1;
            }
            MergeableState::Unstable => {
                let check_runs = pulls.list_check_runs(&pr.head_sha).await?;
                let statuses = pulls.list_statuses(&pr.statuses_url).await?;
                let summary = evaluate_checks(&check_runs, &statuses, &settings.checks_to_skip);
                debug!(
                    pr_number,
                    pending = summary.has_pending,
                    failing = summary.has_failing,
                    "evaluated checks"
                );

                if summary.has_pending {
                    if settings.skip_pending_checks {
                        info!(pr_number, "skipping pending checks based on settings");
                        exit = LoopExit::SkipValidation;
                        break;
                    }
                    info!(pr_number, "PR has incomplete checks, waiting");
                    sleeper.sleep(settings.checks_timeout).await;
                    check_waits += 1;
                } else if summary.has_failing {
                    if settings.skip_failing_checks {
                        warn!(pr_number, "PR has failing checks, merging anyway based on settings");
                        exit = LoopExit::SkipValidation;
                        break;
                    }
                    return Err(IssueErrorKind::FailedChecks.into());
                } else {
                    // Nothing pending or failing among the checks we care about
                    exit = LoopExit::SkipValidation;
                    break;
                }
            }
            _ => break,
        }

        pr = pulls.fetch_pull_request(pr_number).await?;
    }

    if matches!(exit, LoopExit::Validate) {
        validate_final_state(pr.mergeable_state)?;
    }

    let result = pulls.merge_pr(pr_number, MergeMethod::Squash).await?;
    if !result.merged {
        return Err(Error::GitHubApi(format!(
            "PR #{pr_number} was not merged: {}",
            result.message.as_deref().unwrap_or("no reason given")
        )));
    }

    if let Err(e) = pulls.create_pr_comment(pr_number, MERGED_COMMENT).await {
        warn!(pr_number, error = %e, "failed to comment on merged PR");
    }

    Ok(result)
}

/// Classify a settled (or given-up-on) mergeable state
fn validate_final_state(state: MergeableState) -> Result<()> {
    match state {
        MergeableState::Blocked => Err(IssueErrorKind::NeedsApproval.into()),
        MergeableState::Dirty => Err(IssueErrorKind::HasMergeConflicts.into()),
        MergeableState::Unknown | MergeableState::Unstable => {
            Err(IssueErrorKind::FailedChecks.into())
        }
        _ => Ok(()),
    }
}
