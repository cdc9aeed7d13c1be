//! Recording fakes for the sleeper, tracker and progress seams

use async_trait::async_trait;
use release_bot::clock::Sleeper;
use release_bot::error::{Error, IssueError, Result};
use release_bot::progress::ProgressCallback;
use release_bot::tracker::IssueTracker;
use release_bot::types::Issue;
use std::sync::Mutex;
use std::time::Duration;

/// Sleeper that returns immediately and records every requested wait
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    /// Number of waits of exactly `duration`
    pub fn count(&self, duration: Duration) -> usize {
        self.sleeps
            .lock()
            .unwrap()
            .iter()
            .filter(|d| **d == duration)
            .count()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Tracker that records status updates
#[derive(Default)]
pub struct RecordingTracker {
    updates: Mutex<Vec<(String, String)>>,
    error_on_update: Mutex<Option<String>>,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_updates(&self, msg: &str) {
        *self.error_on_update.lock().unwrap() = Some(msg.to_string());
    }

    /// `(issue_id, status)` pairs in call order
    pub fn updates(&self) -> Vec<(String, String)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueTracker for RecordingTracker {
    async fn update_status(&self, issue_id: &str, status: &str) -> Result<()> {
        self.updates
            .lock()
            .unwrap()
            .push((issue_id.to_string(), status.to_string()));
        if let Some(msg) = self.error_on_update.lock().unwrap().as_ref() {
            return Err(Error::Tracker(msg.clone()));
        }
        Ok(())
    }
}

/// Progress callback that records merged and failed issue ids
#[derive(Default)]
pub struct RecordingProgress {
    messages: Mutex<Vec<String>>,
    merged: Mutex<Vec<String>>,
    failed: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn merged(&self) -> Vec<String> {
        self.merged.lock().unwrap().clone()
    }

    pub fn failed(&self) -> Vec<String> {
        self.failed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    async fn on_merged(&self, issue: &Issue) {
        self.merged.lock().unwrap().push(issue.id.clone());
    }

    async fn on_failed(&self, error: &IssueError) {
        let id = error.issue.as_ref().map_or_else(String::new, |i| i.id.clone());
        self.failed.lock().unwrap().push(id);
    }
}
