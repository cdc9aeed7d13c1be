//! Shared test utilities

#![allow(dead_code)]

mod mock_pipeline;
mod mock_pulls;
mod recorders;

pub use mock_pipeline::MockPipelineService;
pub use mock_pulls::{CreateCommentCall, MergePrCall, MockPullRequestService};
pub use recorders::{RecordingProgress, RecordingSleeper, RecordingTracker};

use chrono::{DateTime, TimeZone, Utc};
use release_bot::types::{
    Assignee, CheckConclusion, CheckRun, CheckRunStatus, CommitState, CommitStatus, Issue,
    MergeableState, Pipeline, PullRequestStatus, Workflow, WorkflowStatus,
};

/// Status label used by test issues
pub const READY: &str = "Ready - Release";

/// Release workflow name used by test pipelines
pub const RELEASE_WORKFLOW: &str = "release_staging";

/// Pull request URL in the test repository
pub fn pr_url(number: u64) -> String {
    format!("https://github.com/acme/web/pull/{number}")
}

/// Ready issue linked to a pull request, assigned to `dev-<id>@acme.test`
pub fn make_issue(id: &str, pr_number: Option<u64>) -> Issue {
    let mut issue = Issue::new(id, format!("Issue {id}"), READY).with_assignee(Assignee {
        id: 1,
        name: format!("dev {id}"),
        email: Some(format!("dev-{id}@acme.test")),
    });
    issue.pull_request = pr_number.map(pr_url);
    issue
}

/// Pull request status in `state`, not yet merged
pub fn pr_status(number: u64, state: MergeableState) -> PullRequestStatus {
    PullRequestStatus {
        number,
        mergeable_state: state,
        mergeable: Some(matches!(state, MergeableState::Clean | MergeableState::Behind)),
        merged: false,
        head_sha: format!("sha-{number}"),
        statuses_url: format!("https://api.github.com/repos/acme/web/statuses/sha-{number}"),
    }
}

/// Check run with an optional conclusion
pub fn check_run(
    name: &str,
    status: CheckRunStatus,
    conclusion: Option<CheckConclusion>,
) -> CheckRun {
    CheckRun {
        name: name.to_string(),
        status,
        conclusion,
    }
}

/// Commit status reported `minute` minutes into the test day
pub fn commit_status(context: &str, state: CommitState, minute: u32) -> CommitStatus {
    CommitStatus {
        context: context.to_string(),
        state,
        reported_at: at_minute(minute),
    }
}

/// Fixed timestamp `minute` minutes after 2024-01-01 10:00 UTC
pub fn at_minute(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 10, minute, 0).unwrap()
}

/// Pipeline with the given id
pub fn pipeline(id: &str) -> Pipeline {
    Pipeline {
        id: id.to_string(),
        number: 0,
        state: "created".to_string(),
        created_at: None,
    }
}

/// Release workflow in `status`
pub fn release_workflow(status: WorkflowStatus) -> Workflow {
    Workflow {
        id: format!("wf-{status:?}"),
        name: RELEASE_WORKFLOW.to_string(),
        status,
    }
}
