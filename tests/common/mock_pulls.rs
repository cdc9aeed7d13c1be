//! Mock pull request service
//!
//! Each PR has a scripted sequence of statuses: every fetch takes the next
//! one and the last is repeated once the script runs out.

use async_trait::async_trait;
use release_bot::error::{Error, Result};
use release_bot::platform::PullRequestService;
use release_bot::types::{CheckRun, CommitStatus, MergeMethod, MergeResult, PullRequestStatus};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Call record for `create_pr_comment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommentCall {
    pub pr_number: u64,
    pub body: String,
}

/// Call record for `merge_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePrCall {
    pub pr_number: u64,
    pub method: MergeMethod,
}

/// Hand-written mock of [`PullRequestService`]
///
/// Features:
/// - Scripted mergeable-state sequences per PR
/// - Check runs per head SHA, commit statuses per statuses URL
/// - Call tracking for verification
/// - Error injection for failure path testing
#[derive(Default)]
pub struct MockPullRequestService {
    pr_scripts: Mutex<HashMap<u64, VecDeque<PullRequestStatus>>>,
    check_runs: Mutex<HashMap<String, Vec<CheckRun>>>,
    statuses: Mutex<HashMap<String, Vec<CommitStatus>>>,
    merge_responses: Mutex<HashMap<u64, MergeResult>>,
    // Call tracking
    fetch_calls: Mutex<Vec<u64>>,
    check_run_calls: Mutex<Vec<String>>,
    status_calls: Mutex<Vec<String>>,
    update_branch_calls: Mutex<Vec<u64>>,
    merge_calls: Mutex<Vec<MergePrCall>>,
    comment_calls: Mutex<Vec<CreateCommentCall>>,
    // Error injection
    error_on_fetch: Mutex<Option<String>>,
    error_on_update_branch: Mutex<Option<String>>,
    error_on_merge: Mutex<Option<String>>,
    error_on_comment: Mutex<Option<String>>,
}

impl MockPullRequestService {
    pub fn new() -> Self {
        Self::default()
    }

    // === Setup ===

    /// Script the statuses returned by successive fetches of one PR
    pub fn set_pr_states(&self, pr_number: u64, states: Vec<PullRequestStatus>) {
        self.pr_scripts
            .lock()
            .unwrap()
            .insert(pr_number, states.into());
    }

    pub fn set_check_runs(&self, head_sha: &str, runs: Vec<CheckRun>) {
        self.check_runs
            .lock()
            .unwrap()
            .insert(head_sha.to_string(), runs);
    }

    pub fn set_statuses(&self, statuses_url: &str, statuses: Vec<CommitStatus>) {
        self.statuses
            .lock()
            .unwrap()
            .insert(statuses_url.to_string(), statuses);
    }

    pub fn set_merge_response(&self, pr_number: u64, result: MergeResult) {
        self.merge_responses
            .lock()
            .unwrap()
            .insert(pr_number, result);
    }

    // === Error injection ===

    pub fn fail_fetch(&self, msg: &str) {
        *self.error_on_fetch.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_update_branch(&self, msg: &str) {
        *self.error_on_update_branch.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_comment(&self, msg: &str) {
        *self.error_on_comment.lock().unwrap() = Some(msg.to_string());
    }

    // === Call inspection ===

    pub fn fetch_calls(&self) -> Vec<u64> {
        self.fetch_calls.lock().unwrap().clone()
    }

    pub fn check_run_calls(&self) -> Vec<String> {
        self.check_run_calls.lock().unwrap().clone()
    }

    pub fn update_branch_calls(&self) -> Vec<u64> {
        self.update_branch_calls.lock().unwrap().clone()
    }

    pub fn merge_calls(&self) -> Vec<MergePrCall> {
        self.merge_calls.lock().unwrap().clone()
    }

    pub fn merged_prs(&self) -> Vec<u64> {
        self.merge_calls().iter().map(|c| c.pr_number).collect()
    }

    pub fn comment_calls(&self) -> Vec<CreateCommentCall> {
        self.comment_calls.lock().unwrap().clone()
    }

    /// Number of calls of any kind
    pub fn total_calls(&self) -> usize {
        self.fetch_calls.lock().unwrap().len()
            + self.check_run_calls.lock().unwrap().len()
            + self.status_calls.lock().unwrap().len()
            + self.update_branch_calls.lock().unwrap().len()
            + self.merge_calls.lock().unwrap().len()
            + self.comment_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PullRequestService for MockPullRequestService {
    async fn fetch_pull_request(&self, pr_number: u64) -> Result<PullRequestStatus> {
        self.fetch_calls.lock().unwrap().push(pr_number);
        if let Some(msg) = self.error_on_fetch.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }

        let mut scripts = self.pr_scripts.lock().unwrap();
        let script = scripts
            .get_mut(&pr_number)
            .ok_or_else(|| Error::GitHubApi(format!("PR #{pr_number} not found")))?;
        let status = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        status.ok_or_else(|| Error::GitHubApi(format!("PR #{pr_number} has no script")))
    }

    async fn list_check_runs(&self, head_sha: &str) -> Result<Vec<CheckRun>> {
        self.check_run_calls
            .lock()
            .unwrap()
            .push(head_sha.to_string());
        Ok(self
            .check_runs
            .lock()
            .unwrap()
            .get(head_sha)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_statuses(&self, statuses_url: &str) -> Result<Vec<CommitStatus>> {
        self.status_calls
            .lock()
            .unwrap()
            .push(statuses_url.to_string());
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(statuses_url)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_branch(&self, pr_number: u64) -> Result<()> {
        self.update_branch_calls.lock().unwrap().push(pr_number);
        if let Some(msg) = self.error_on_update_branch.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(())
    }

    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<MergeResult> {
        self.merge_calls
            .lock()
            .unwrap()
            .push(MergePrCall { pr_number, method });
        if let Some(msg) = self.error_on_merge.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(self
            .merge_responses
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .unwrap_or(MergeResult {
                merged: true,
                sha: Some(format!("merge-sha-{pr_number}")),
                message: None,
            }))
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        self.comment_calls.lock().unwrap().push(CreateCommentCall {
            pr_number,
            body: body.to_string(),
        });
        if let Some(msg) = self.error_on_comment.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(())
    }
}
