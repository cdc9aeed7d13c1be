//! Mock pipeline service
//!
//! Scripted as a sequence of snapshots: each `list_pipelines` call moves to
//! the next snapshot (the last one repeats), and `list_workflows` answers
//! from the current snapshot.

use async_trait::async_trait;
use release_bot::error::{Error, Result};
use release_bot::platform::PipelineService;
use release_bot::types::{Pipeline, Workflow};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Pipelines, newest first, each with its workflows
pub type Snapshot = Vec<(Pipeline, Vec<Workflow>)>;

/// Hand-written mock of [`PipelineService`]
#[derive(Default)]
pub struct MockPipelineService {
    snapshots: Mutex<VecDeque<Snapshot>>,
    current: Mutex<Snapshot>,
    // Call tracking
    list_pipelines_calls: Mutex<Vec<(String, String)>>,
    list_workflows_calls: Mutex<Vec<String>>,
    // Error injection
    error_on_list_pipelines: Mutex<Option<String>>,
}

impl MockPipelineService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that always returns the same pipelines
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let mock = Self::new();
        mock.push_snapshot(snapshot);
        mock
    }

    /// Queue the answer for a later `list_pipelines` call
    pub fn push_snapshot(&self, snapshot: Snapshot) {
        self.snapshots.lock().unwrap().push_back(snapshot);
    }

    pub fn fail_list_pipelines(&self, msg: &str) {
        *self.error_on_list_pipelines.lock().unwrap() = Some(msg.to_string());
    }

    pub fn list_pipelines_calls(&self) -> Vec<(String, String)> {
        self.list_pipelines_calls.lock().unwrap().clone()
    }

    pub fn list_workflows_calls(&self) -> Vec<String> {
        self.list_workflows_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PipelineService for MockPipelineService {
    async fn list_pipelines(&self, project_slug: &str, branch: &str) -> Result<Vec<Pipeline>> {
        self.list_pipelines_calls
            .lock()
            .unwrap()
            .push((project_slug.to_string(), branch.to_string()));
        if let Some(msg) = self.error_on_list_pipelines.lock().unwrap().as_ref() {
            return Err(Error::CircleCiApi(msg.clone()));
        }

        let mut snapshots = self.snapshots.lock().unwrap();
        let next = if snapshots.len() > 1 {
            snapshots.pop_front()
        } else {
            snapshots.front().cloned()
        };
        let snapshot = next.unwrap_or_default();
        let pipelines = snapshot.iter().map(|(p, _)| p.clone()).collect();
        *self.current.lock().unwrap() = snapshot;
        Ok(pipelines)
    }

    async fn list_workflows(&self, pipeline_id: &str) -> Result<Vec<Workflow>> {
        self.list_workflows_calls
            .lock()
            .unwrap()
            .push(pipeline_id.to_string());
        Ok(self
            .current
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p.id == pipeline_id)
            .map(|(_, workflows)| workflows.clone())
            .unwrap_or_default())
    }
}
