//! GitHub token resolution

use super::{AuthSource, token_from_env};
use crate::error::{Error, Result};
use tokio::process::Command;
use tracing::debug;

/// Environment variables checked for a GitHub token, in order
const TOKEN_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// GitHub authentication configuration
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
}

/// Get GitHub authentication
///
/// Priority:
/// 1. `GITHUB_TOKEN` / `GH_TOKEN` environment variables
/// 2. `gh auth token` (GitHub CLI)
pub async fn get_github_auth() -> Result<GitHubAuthConfig> {
    if let Some(token) = token_from_env(TOKEN_VARS) {
        debug!("using GitHub token from environment");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::EnvVar,
        });
    }

    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .await
        .map_err(|e| {
            Error::Auth(format!(
                "no GitHub token: set GITHUB_TOKEN or install the gh CLI ({e})"
            ))
        })?;

    if !output.status.success() {
        return Err(Error::Auth(
            "no GitHub token: set GITHUB_TOKEN or run 'gh auth login'".to_string(),
        ));
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(Error::Auth("gh auth token returned an empty token".to_string()));
    }

    debug!("using GitHub token from gh CLI");
    Ok(GitHubAuthConfig {
        token,
        source: AuthSource::Cli,
    })
}
