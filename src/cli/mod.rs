//! CLI command implementations

mod config;
mod context;
mod merge;
pub mod style;

pub use config::{ConfigCommand, run_config};
pub use merge::{MergeOptions, run_merge};

use anstream::println;
use async_trait::async_trait;
use release_bot::error::IssueError;
use release_bot::progress::ProgressCallback;
use release_bot::types::Issue;
use style::{Stylize, check, cross};

/// Progress callback that prints one line per event
pub struct CliProgress;

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        println!("{}", message.muted());
    }

    async fn on_merged(&self, issue: &Issue) {
        println!("{} Merged {}", check(), issue.title.emphasis());
    }

    async fn on_failed(&self, error: &IssueError) {
        let title = error.issue.as_ref().map_or("unknown issue", |i| i.title.as_str());
        println!("{} {}: {}", cross(), title.emphasis(), error.kind.warn());
    }
}
