//! Check evaluation for unstable pull requests
//!
//! GitHub exposes CI results through two APIs: check runs (GitHub Actions and
//! most apps) and legacy commit statuses (external CI). Some integrations only
//! report through one of them, so both are evaluated together.

use crate::error::{Error, Result};
use crate::types::{CheckConclusion, CheckRun, CheckRunStatus, CommitState, CommitStatus};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::str::FromStr;

/// A check name to ignore when evaluating an unstable pull request
///
/// Parsed from configuration: `/pattern/flags` compiles to a regex, anything
/// else matches as a literal substring.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub enum SkipPattern {
    /// Matches names containing this substring
    Literal(String),
    /// Matches names the regex finds a match in
    Pattern {
        /// The pattern as written, `/.../flags`
        source: String,
        /// Compiled regex
        regex: Regex,
    },
}

impl SkipPattern {
    /// Whether a check or status context with this name is ignored
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Literal(needle) => name.contains(needle.as_str()),
            Self::Pattern { regex, .. } => regex.is_match(name),
        }
    }
}

impl FromStr for SkipPattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((pattern, flags)) = split_regex_literal(s) else {
            return Ok(Self::Literal(s.to_string()));
        };

        let mut builder = RegexBuilder::new(pattern);
        for flag in flags.chars() {
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'x' => {
                    builder.ignore_whitespace(true);
                }
                // Global/sticky/unicode have no effect on a single is_match
                'g' | 'y' | 'u' => {}
                other => {
                    return Err(Error::Config(format!(
                        "unsupported regex flag '{other}' in skip pattern {s}"
                    )));
                }
            }
        }

        builder
            .build()
            .map(|regex| Self::Pattern {
                source: s.to_string(),
                regex,
            })
            .map_err(|e| Error::Config(format!("invalid skip pattern {s}: {e}")))
    }
}

impl TryFrom<String> for SkipPattern {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl std::fmt::Display for SkipPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(s) | Self::Pattern { source: s, .. } => f.write_str(s),
        }
    }
}

impl Serialize for SkipPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Split `/pattern/flags` into its parts. The pattern must be non-empty.
fn split_regex_literal(s: &str) -> Option<(&str, &str)> {
    let rest = s.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    let (pattern, flags) = (&rest[..end], &rest[end + 1..]);
    if pattern.is_empty() {
        return None;
    }
    Some((pattern, flags))
}

fn is_skipped(name: &str, skip: &[SkipPattern]) -> bool {
    skip.iter().any(|p| p.matches(name))
}

/// Outcome of evaluating a pull request's checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChecksSummary {
    /// At least one non-ignored check is still running
    pub has_pending: bool,
    /// At least one non-ignored check failed
    pub has_failing: bool,
}

/// Evaluate check runs and commit statuses, ignoring names matching `skip`
///
/// Commit statuses are a history: only the newest report per context
/// counts, so an old `failure` superseded by a `success` is not failing.
pub fn evaluate_checks(
    check_runs: &[CheckRun],
    statuses: &[CommitStatus],
    skip: &[SkipPattern],
) -> ChecksSummary {
    let mut summary = ChecksSummary::default();

    for run in check_runs.iter().filter(|r| !is_skipped(&r.name, skip)) {
        match run.status {
            CheckRunStatus::Queued | CheckRunStatus::InProgress => summary.has_pending = true,
            CheckRunStatus::Completed if run.conclusion == Some(CheckConclusion::Failure) => {
                summary.has_failing = true;
            }
            _ => {}
        }
    }

    for status in latest_statuses(statuses) {
        if is_skipped(&status.context, skip) {
            continue;
        }
        match status.state {
            CommitState::Pending => summary.has_pending = true,
            CommitState::Failure => summary.has_failing = true,
            _ => {}
        }
    }

    summary
}

/// Newest report for each status context, newest first
pub fn latest_statuses(statuses: &[CommitStatus]) -> Vec<&CommitStatus> {
    let mut ordered: Vec<&CommitStatus> = statuses.iter().collect();
    // Stable sort: reports with equal timestamps keep the service's order
    ordered.sort_by(|a, b| b.reported_at.cmp(&a.reported_at));

    let mut seen = HashSet::new();
    ordered
        .into_iter()
        .filter(|s| seen.insert(s.context.as_str()))
        .collect()
}
