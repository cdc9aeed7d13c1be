//! GitHub pull request service implementation

use crate::error::{Error, Result};
use crate::platform::PullRequestService;
use crate::types::{
    CheckConclusion, CheckRun, CheckRunStatus, CommitState, CommitStatus, MergeMethod,
    MergeResult, MergeableState, PullRequestStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Page size for list endpoints (GitHub maximum)
const PER_PAGE: u32 = 100;

#[derive(Deserialize)]
struct RawPullRequest {
    number: u64,
    #[serde(default)]
    merged: bool,
    mergeable: Option<bool>,
    mergeable_state: Option<MergeableState>,
    head: RawHead,
    statuses_url: String,
}

#[derive(Deserialize)]
struct RawHead {
    sha: String,
}

#[derive(Deserialize)]
struct RawCheckRuns {
    check_runs: Vec<RawCheckRun>,
}

#[derive(Deserialize)]
struct RawCheckRun {
    name: String,
    status: CheckRunStatus,
    conclusion: Option<CheckConclusion>,
}

#[derive(Deserialize)]
struct RawStatus {
    context: String,
    state: CommitState,
    updated_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// GitHub service using octocrab for writes and raw REST calls for status
/// queries
pub struct GitHubService {
    client: Octocrab,
    owner: String,
    repo: String,
    /// Token for raw HTTP requests
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
    /// API host for raw requests
    api_host: String,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        let api_host = if let Some(ref h) = host {
            let base_url = format!("https://{h}/api/v3");
            builder = builder
                .base_uri(&base_url)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
            format!("{h}/api/v3")
        } else {
            "api.github.com".to_string()
        };

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("release-bot")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            owner,
            repo,
            token: token.to_string(),
            http_client,
            api_host,
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "https://{}/repos/{}/{}/{path}",
            self.api_host, self.owner, self.repo
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// GET a GitHub REST endpoint and decode the JSON body
    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let response = self
            .authorized(self.http_client.get(url))
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to fetch {what}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::GitHubApi(format!(
                "Fetching {what} returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse {what}: {e}")))
    }
}

#[async_trait]
impl PullRequestService for GitHubService {
    async fn fetch_pull_request(&self, pr_number: u64) -> Result<PullRequestStatus> {
        debug!(pr_number, "fetching PR");
        let url = self.repo_url(&format!("pulls/{pr_number}"));
        let pr: RawPullRequest = self.get_json(&url, "pull request").await?;

        let status = PullRequestStatus {
            number: pr.number,
            // GitHub omits the field while the mergeability job runs
            mergeable_state: pr.mergeable_state.unwrap_or(MergeableState::Unknown),
            mergeable: pr.mergeable,
            merged: pr.merged,
            head_sha: pr.head.sha,
            statuses_url: pr.statuses_url,
        };
        debug!(pr_number, state = %status.mergeable_state, "fetched PR");
        Ok(status)
    }

    async fn list_check_runs(&self, head_sha: &str) -> Result<Vec<CheckRun>> {
        debug!(head_sha, "listing check runs");
        let url = self.repo_url(&format!(
            "commits/{head_sha}/check-runs?per_page={PER_PAGE}"
        ));
        let runs: RawCheckRuns = self.get_json(&url, "check runs").await?;

        let result: Vec<CheckRun> = runs
            .check_runs
            .into_iter()
            .map(|r| CheckRun {
                name: r.name,
                status: r.status,
                conclusion: r.conclusion,
            })
            .collect();
        debug!(head_sha, count = result.len(), "listed check runs");
        Ok(result)
    }

    async fn list_statuses(&self, statuses_url: &str) -> Result<Vec<CommitStatus>> {
        debug!(statuses_url, "listing commit statuses");
        let url = format!("{statuses_url}?per_page={PER_PAGE}");
        let statuses: Vec<RawStatus> = self.get_json(&url, "commit statuses").await?;

        let result: Vec<CommitStatus> = statuses
            .into_iter()
            .map(|s| CommitStatus {
                context: s.context,
                state: s.state,
                reported_at: s.updated_at.unwrap_or(s.created_at),
            })
            .collect();
        debug!(count = result.len(), "listed commit statuses");
        Ok(result)
    }

    async fn update_branch(&self, pr_number: u64) -> Result<()> {
        debug!(pr_number, "updating PR branch");
        let url = self.repo_url(&format!("pulls/{pr_number}/update-branch"));

        let response = self
            .authorized(self.http_client.put(&url))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to update branch: {e}")))?;

        // 202 Accepted: the update runs asynchronously on GitHub's side
        if !response.status().is_success() {
            return Err(Error::GitHubApi(format!(
                "Updating branch of PR #{pr_number} returned {}",
                response.status()
            )));
        }

        debug!(pr_number, "requested PR branch update");
        Ok(())
    }

    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<MergeResult> {
        debug!(pr_number, %method, "merging PR");

        let octocrab_method = match method {
            MergeMethod::Squash => octocrab::params::pulls::MergeMethod::Squash,
        };

        let result = self
            .client
            .pulls(&self.owner, &self.repo)
            .merge(pr_number)
            .method(octocrab_method)
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Merge failed: {e}")))?;

        let merge_result = MergeResult {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        };

        debug!(
            pr_number,
            merged = merge_result.merged,
            sha = ?merge_result.sha,
            "merge complete"
        );
        Ok(merge_result)
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        debug!(pr_number, "creating PR comment");
        self.client
            .issues(&self.owner, &self.repo)
            .create_comment(pr_number, body)
            .await?;
        debug!(pr_number, "created PR comment");
        Ok(())
    }
}
