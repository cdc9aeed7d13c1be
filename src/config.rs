//! Release configuration
//!
//! Loaded from TOML. Every key is optional; missing keys fall back to the
//! defaults below. Durations are whole seconds.
//!
//! ```toml
//! merge_delay = 120
//! first_merge_delay = 300
//! checks_to_skip = ["codecov", "/^percy/i"]
//!
//! [github]
//! owner = "binary-com"
//! repo = "deriv-app"
//!
//! [circleci]
//! project_slug = "gh/binary-com/deriv-app"
//! branch = "master"
//! workflow_name = "release_staging"
//!
//! [pull_request]
//! refetch_limit = 10
//! refetch_timeout = 5
//! checks_limit = 120
//! checks_timeout = 60
//! ```

use crate::checks::SkipPattern;
use crate::error::{Error, Result};
use crate::merge::{DrainOptions, MergeSettings};
use crate::pipeline::PipelineTarget;
use crate::platform::parse_repo_slug;
use crate::tracker::{DEFAULT_FAILED_STATUS, DEFAULT_MERGED_STATUS, DEFAULT_READY_STATUS};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "release-bot.toml";

/// Directory under the user config dir
const CONFIG_DIR: &str = "release-bot";

/// Config file name under [`CONFIG_DIR`]
const CONFIG_FILE: &str = "config.toml";

/// Repository slug set by GitHub Actions
const GITHUB_REPOSITORY_ENV: &str = "GITHUB_REPOSITORY";

/// Target repository on GitHub
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubConfig {
    /// Repository owner (falls back to `GITHUB_REPOSITORY`)
    pub owner: Option<String>,
    /// Repository name (falls back to `GITHUB_REPOSITORY`)
    pub repo: Option<String>,
    /// GitHub Enterprise host (None for github.com)
    pub host: Option<String>,
}

/// Release pipeline watched between merges
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CircleCiConfig {
    /// Project slug, `vcs/org/repo`
    pub project_slug: Option<String>,
    /// Branch the release merges into
    pub branch: String,
    /// Workflow whose failure halts the release
    pub workflow_name: String,
    /// API root override (self-hosted server)
    pub api_url: Option<String>,
}

impl Default for CircleCiConfig {
    fn default() -> Self {
        Self {
            project_slug: None,
            branch: "master".to_string(),
            workflow_name: "release_staging".to_string(),
            api_url: None,
        }
    }
}

/// Polling limits for a single pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PullRequestConfig {
    /// Maximum refetches of an `unknown` PR
    pub refetch_limit: u32,
    /// Seconds between refetches
    pub refetch_timeout: u64,
    /// Maximum waits for checks on a `behind`/`unstable` PR
    pub checks_limit: u32,
    /// Seconds between check waits
    pub checks_timeout: u64,
}

impl Default for PullRequestConfig {
    fn default() -> Self {
        Self {
            refetch_limit: 10,
            refetch_timeout: 5,
            checks_limit: 120,
            checks_timeout: 60,
        }
    }
}

/// Tracker status labels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusConfig {
    /// Status an issue must have to be released
    pub ready: String,
    /// Status set after merging
    pub merged: String,
    /// Status set after a failure
    pub failed: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            ready: DEFAULT_READY_STATUS.to_string(),
            merged: DEFAULT_MERGED_STATUS.to_string(),
            failed: DEFAULT_FAILED_STATUS.to_string(),
        }
    }
}

/// Complete release configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct ReleaseConfig {
    /// Maximum number of issues released in one run
    pub max_task_count: Option<usize>,
    /// Seconds to wait after each merge but the first
    pub merge_delay: u64,
    /// Seconds to wait after the first merge
    pub first_merge_delay: u64,
    /// Do not watch the release pipeline between merges
    pub skip_circleci_checks: bool,
    /// Merge without waiting for pending checks
    pub skip_pending_checks: bool,
    /// Merge `behind` PRs without updating them, when GitHub allows it
    pub skip_updating_branch: bool,
    /// Merge despite failing non-required checks
    pub skip_failing_checks: bool,
    /// Checks ignored on unstable PRs: literal substrings or `/regex/flags`
    pub checks_to_skip: Vec<SkipPattern>,
    // Tables last so the struct serializes to valid TOML
    /// Target repository
    pub github: GitHubConfig,
    /// Release pipeline
    pub circleci: CircleCiConfig,
    /// Per-PR polling limits
    pub pull_request: PullRequestConfig,
    /// Tracker status labels
    pub statuses: StatusConfig,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            github: GitHubConfig::default(),
            circleci: CircleCiConfig::default(),
            pull_request: PullRequestConfig::default(),
            statuses: StatusConfig::default(),
            max_task_count: None,
            merge_delay: 2 * 60,
            first_merge_delay: 5 * 60,
            skip_circleci_checks: false,
            skip_pending_checks: false,
            skip_updating_branch: false,
            skip_failing_checks: false,
            checks_to_skip: Vec::new(),
        }
    }
}

impl ReleaseConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse config: {e}")))
    }

    /// Load configuration
    ///
    /// Uses `path` when given (it must exist), otherwise the first existing
    /// of `./release-bot.toml` and `<config dir>/release-bot/config.toml`,
    /// otherwise defaults. Returns the file that was read, if any.
    pub fn load(path: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_paths().into_iter().find(|p| p.is_file()),
        };

        let Some(config_path) = candidate else {
            debug!("no config file found, using defaults");
            return Ok((Self::default(), None));
        };

        let content = fs::read_to_string(&config_path).map_err(|e| {
            Error::Config(format!("failed to read {}: {e}", config_path.display()))
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %config_path.display(), "loaded config");
        Ok((config, Some(config_path)))
    }

    /// Serialize back to TOML (for `config show`)
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))
    }

    /// Repository owner and name
    ///
    /// Config values win; `GITHUB_REPOSITORY` (`owner/repo`) fills the gaps.
    pub fn repository(&self) -> Result<(String, String)> {
        if let (Some(owner), Some(repo)) = (&self.github.owner, &self.github.repo) {
            return Ok((owner.clone(), repo.clone()));
        }

        let slug = env::var(GITHUB_REPOSITORY_ENV).map_err(|_| {
            Error::Config(format!(
                "repository not configured: set [github] owner/repo or {GITHUB_REPOSITORY_ENV}"
            ))
        })?;
        let (owner, repo) = parse_repo_slug(&slug)?;
        Ok((
            self.github.owner.clone().unwrap_or(owner),
            self.github.repo.clone().unwrap_or(repo),
        ))
    }

    /// Settings for the per-PR merge state machine
    pub fn merge_settings(&self) -> MergeSettings {
        MergeSettings {
            refetch_limit: self.pull_request.refetch_limit,
            checks_limit: self.pull_request.checks_limit,
            refetch_timeout: Duration::from_secs(self.pull_request.refetch_timeout),
            checks_timeout: Duration::from_secs(self.pull_request.checks_timeout),
            skip_pending_checks: self.skip_pending_checks,
            skip_failing_checks: self.skip_failing_checks,
            skip_updating_branch: self.skip_updating_branch,
            checks_to_skip: self.checks_to_skip.clone(),
        }
    }

    /// Options for the queue drainer
    pub fn drain_options(&self) -> DrainOptions {
        DrainOptions {
            first_merge_delay: Duration::from_secs(self.first_merge_delay),
            merge_delay: Duration::from_secs(self.merge_delay),
            merged_status: self.statuses.merged.clone(),
        }
    }

    /// Release pipeline to watch; `None` when pipeline checks are disabled
    pub fn pipeline_target(&self) -> Result<Option<PipelineTarget>> {
        if self.skip_circleci_checks {
            return Ok(None);
        }
        let project_slug = self.circleci.project_slug.clone().ok_or_else(|| {
            Error::Config(
                "circleci.project_slug is required unless skip_circleci_checks = true".to_string(),
            )
        })?;
        Ok(Some(PipelineTarget {
            project_slug,
            branch: self.circleci.branch.clone(),
            workflow_name: self.circleci.workflow_name.clone(),
        }))
    }
}

/// Config file locations, in lookup order
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(CONFIG_DIR).join(CONFIG_FILE));
    }
    paths
}
