//! CircleCI pipeline service implementation

use crate::error::{Error, Result};
use crate::platform::PipelineService;
use crate::types::{Pipeline, Workflow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// CircleCI v2 API root
pub const CIRCLECI_API_URL: &str = "https://circleci.com/api/v2";

/// Paginated CircleCI list response; only the first page is read
#[derive(Deserialize)]
struct Page<T> {
    items: Vec<T>,
}

/// CircleCI service using the v2 REST API
pub struct CircleCiService {
    http_client: Client,
    token: String,
    base_url: String,
}

impl CircleCiService {
    /// Create a service against the public CircleCI API
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, CIRCLECI_API_URL)
    }

    /// Create a service against a custom API root (self-hosted server, tests)
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent("release-bot")
            .build()
            .map_err(|e| Error::CircleCiApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            token: token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_page<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<Vec<T>> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .header("Circle-Token", &self.token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::CircleCiApi(format!("Failed to fetch {what}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::CircleCiApi(format!(
                "Fetching {what} returned {}",
                response.status()
            )));
        }

        let page: Page<T> = response
            .json()
            .await
            .map_err(|e| Error::CircleCiApi(format!("Failed to parse {what}: {e}")))?;
        Ok(page.items)
    }
}

#[async_trait]
impl PipelineService for CircleCiService {
    async fn list_pipelines(&self, project_slug: &str, branch: &str) -> Result<Vec<Pipeline>> {
        debug!(project_slug, branch, "listing pipelines");
        let path = format!(
            "project/{project_slug}/pipeline?branch={}",
            urlencoding::encode(branch)
        );
        let pipelines: Vec<Pipeline> = self.get_page(&path, "pipelines").await?;
        debug!(project_slug, count = pipelines.len(), "listed pipelines");
        Ok(pipelines)
    }

    async fn list_workflows(&self, pipeline_id: &str) -> Result<Vec<Workflow>> {
        debug!(pipeline_id, "listing workflows");
        let workflows: Vec<Workflow> = self
            .get_page(&format!("pipeline/{pipeline_id}/workflow"), "workflows")
            .await?;
        debug!(pipeline_id, count = workflows.len(), "listed workflows");
        Ok(workflows)
    }
}
