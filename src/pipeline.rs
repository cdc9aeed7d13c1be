//! Release pipeline gate
//!
//! After each merge the release workflow on the target branch starts a new
//! pipeline. The gate remembers every pipeline it has seen running and
//! aborts the release only if one of *those* later fails. Failures of
//! pipelines it never saw running (older runs, unrelated pushes) are ignored.

use crate::error::{IssueError, IssueErrorKind, Result};
use crate::platform::PipelineService;
use crate::types::WorkflowStatus;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Branch and workflow whose failure halts the release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineTarget {
    /// Project slug in the form `vcs/org/repo` (e.g., `gh/binary-com/deriv-app`)
    pub project_slug: String,
    /// Branch the release merges into
    pub branch: String,
    /// Name of the release workflow
    pub workflow_name: String,
}

/// Watches the release workflow across merges
pub struct PipelineGate<'a> {
    service: &'a dyn PipelineService,
    target: PipelineTarget,
    /// Pipelines observed running; only grows
    observed_running: HashSet<String>,
}

impl<'a> PipelineGate<'a> {
    /// Create a gate for `target`
    pub fn new(service: &'a dyn PipelineService, target: PipelineTarget) -> Self {
        Self {
            service,
            target,
            observed_running: HashSet::new(),
        }
    }

    /// The branch/workflow being watched
    pub const fn target(&self) -> &PipelineTarget {
        &self.target
    }

    /// Pipelines seen running so far
    pub const fn observed_running(&self) -> &HashSet<String> {
        &self.observed_running
    }

    /// Inspect up to `max_pipelines` recent pipelines
    ///
    /// Records pipelines whose release workflow is running, and returns a
    /// [`IssueErrorKind::FailedWorkflow`] error if a previously recorded
    /// pipeline's workflow has failed.
    pub async fn check_pipeline_status(&mut self, max_pipelines: usize) -> Result<()> {
        let pipelines = self
            .service
            .list_pipelines(&self.target.project_slug, &self.target.branch)
            .await?;

        debug!(
            count = pipelines.len(),
            max_pipelines, "inspecting release pipelines"
        );

        for pipeline in pipelines.iter().take(max_pipelines) {
            let workflows = self.service.list_workflows(&pipeline.id).await?;
            let Some(workflow) = workflows
                .iter()
                .find(|w| w.name == self.target.workflow_name)
            else {
                continue;
            };

            match workflow.status {
                WorkflowStatus::Failed if self.observed_running.contains(&pipeline.id) => {
                    warn!(
                        pipeline_id = %pipeline.id,
                        workflow = %workflow.name,
                        "release workflow failed"
                    );
                    return Err(IssueError::new(IssueErrorKind::FailedWorkflow).into());
                }
                WorkflowStatus::Failed => {
                    debug!(pipeline_id = %pipeline.id, "ignoring failure of unobserved pipeline");
                }
                WorkflowStatus::Running => {
                    if self.observed_running.insert(pipeline.id.clone()) {
                        info!(pipeline_id = %pipeline.id, "observed running release workflow");
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}
