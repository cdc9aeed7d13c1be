//! Sleeping behind a trait so waits can be recorded in tests

use async_trait::async_trait;
use std::time::Duration;

/// Source of cooperative waits
///
/// Production code injects [`TokioSleeper`]. Tests inject a recorder that
/// returns immediately and keeps the requested durations.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
