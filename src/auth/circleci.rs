//! CircleCI token resolution

use super::{AuthSource, token_from_env};
use crate::error::{Error, Result};

/// Environment variables checked for a CircleCI token, in order
const TOKEN_VARS: &[&str] = &["CIRCLECI_TOKEN", "CIRCLE_TOKEN"];

/// CircleCI authentication configuration
#[derive(Debug, Clone)]
pub struct CircleCiAuthConfig {
    /// Personal API token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
}

/// Get CircleCI authentication from `CIRCLECI_TOKEN` (or `CIRCLE_TOKEN`)
pub fn get_circleci_auth() -> Result<CircleCiAuthConfig> {
    token_from_env(TOKEN_VARS)
        .map(|token| CircleCiAuthConfig {
            token,
            source: AuthSource::EnvVar,
        })
        .ok_or_else(|| {
            Error::Auth(
                "no CircleCI token: set CIRCLECI_TOKEN or skip_circleci_checks = true".to_string(),
            )
        })
}
