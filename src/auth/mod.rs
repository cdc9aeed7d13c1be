//! Authentication for GitHub and CircleCI
//!
//! Supports environment variables, plus the `gh` CLI for GitHub.

mod circleci;
mod github;

pub use circleci::{CircleCiAuthConfig, get_circleci_auth};
pub use github::{GitHubAuthConfig, get_github_auth};

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from CLI tool (gh)
    Cli,
    /// Token from environment variable
    EnvVar,
}

impl std::fmt::Display for AuthSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::EnvVar => write!(f, "environment"),
        }
    }
}

/// First non-empty value among the given environment variables
fn token_from_env(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
