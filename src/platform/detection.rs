//! Pull request link parsing

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Link written by tracker automations: `[https://github.com/...]`
static AUTOMATED_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(https://github\.com/[^\]\s]+)\]").expect("valid automated link regex")
});

/// Any GitHub link pasted into free text
static PLAIN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https://github\.com/\S+").expect("valid plain link regex"));

/// Find the pull request link in an issue description
///
/// Prefers the bracketed link written by automations, falling back to the
/// first GitHub link in the text.
pub fn find_pull_request_link(description: &str) -> Option<String> {
    if let Some(caps) = AUTOMATED_LINK.captures(description) {
        return Some(caps[1].to_string());
    }
    PLAIN_LINK
        .find(description)
        .map(|m| m.as_str().trim_end_matches([')', '.', ',']).to_string())
}

/// Extract the PR number from a pull request URL
///
/// Takes the path segment following `pull` (case-insensitive), so
/// `https://github.com/o/r/pull/42/files` yields 42.
pub fn parse_pull_request_number(url: &str) -> Option<u64> {
    let parsed = Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?;
    segments.find(|s| s.eq_ignore_ascii_case("pull"))?;
    segments.next()?.parse().ok()
}

/// Parse an `owner/repo` slug (as found in `GITHUB_REPOSITORY`)
pub fn parse_repo_slug(slug: &str) -> Result<(String, String)> {
    let slug = slug.trim().trim_matches('/');
    match slug.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(Error::Config(format!(
            "invalid repository '{slug}', expected owner/repo"
        ))),
    }
}
