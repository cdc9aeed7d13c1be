//! Shared setup for commands that talk to GitHub and CircleCI

use release_bot::auth::{get_circleci_auth, get_github_auth};
use release_bot::config::ReleaseConfig;
use release_bot::error::Result;
use release_bot::platform::{CircleCiService, GitHubService};
use tracing::debug;

/// Authenticated services for one release run
///
/// The CircleCI service is only created when pipeline checks are enabled,
/// so a run with `skip_circleci_checks` needs no CircleCI token.
pub struct CommandContext {
    /// GitHub pull request service
    pub github: GitHubService,
    /// CircleCI pipeline service
    pub circleci: Option<CircleCiService>,
}

impl CommandContext {
    /// Resolve tokens and build the services described by `config`
    pub async fn new(config: &ReleaseConfig) -> Result<Self> {
        let (owner, repo) = config.repository()?;
        let auth = get_github_auth().await?;
        debug!(source = %auth.source, %owner, %repo, "resolved GitHub token");
        let github = GitHubService::new(&auth.token, owner, repo, config.github.host.clone())?;

        let circleci = if config.skip_circleci_checks {
            None
        } else {
            let auth = get_circleci_auth()?;
            let service = match &config.circleci.api_url {
                Some(url) => CircleCiService::with_base_url(&auth.token, url)?,
                None => CircleCiService::new(&auth.token)?,
            };
            Some(service)
        };

        Ok(Self { github, circleci })
    }
}
