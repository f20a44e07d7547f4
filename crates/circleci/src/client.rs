use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    Job, JobId, JobProvider, JobSummary, ProviderError, RepositoryId, WorkflowId, WorkflowJobList,
};
use provider_http::{malformed, send_json};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use thiserror::Error;
use tracing::warn;

use crate::wire::{JobDetails, WorkflowJobsPage};

/// Public CircleCI v2 API root.
pub const DEFAULT_API_URL: &str = "https://circleci.com/api/v2";

const MAX_PAGES: usize = 20;

/// Errors raised while constructing a [`CircleCiClient`].
#[derive(Debug, Error)]
pub enum CircleCiClientError {
    #[error("CircleCI token contains characters not allowed in an HTTP header")]
    InvalidToken,

    #[error("failed to build CircleCI HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Connection settings for [`CircleCiClient`].
#[derive(Debug, Clone)]
pub struct CircleCiClientConfig {
    pub api_url: String,
    /// VCS prefix of project slugs (`gh` for GitHub-hosted projects).
    pub vcs: String,
    /// Sent as `Circle-Token`. Public projects can be read without one.
    pub token: Option<String>,
    pub request_timeout: Duration,
}

impl Default for CircleCiClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            vcs: "gh".to_string(),
            token: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircleCiClient {
    http: reqwest::Client,
    api_url: String,
    vcs: String,
}

impl CircleCiClient {
    pub fn new(config: CircleCiClientConfig) -> Result<Self, CircleCiClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = config.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let mut value =
                HeaderValue::from_str(token).map_err(|_| CircleCiClientError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert("circle-token", value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            vcs: config.vcs,
        })
    }
}

#[async_trait]
impl JobProvider for CircleCiClient {
    async fn get_job(&self, repository: &RepositoryId, job: &JobId) -> Result<Job, ProviderError> {
        let url = format!("{}/project/{}/{repository}/job/{job}", self.api_url, self.vcs);
        let details: JobDetails = send_json("get job", self.http.get(url)).await?;
        let workflow_id = WorkflowId::new(details.latest_workflow.id)
            .ok_or_else(|| malformed("get job", "empty latest_workflow.id"))?;
        Ok(Job {
            id: job.clone(),
            web_url: details.web_url,
            workflow_id,
        })
    }

    async fn list_workflow_jobs(
        &self,
        workflow: &WorkflowId,
    ) -> Result<WorkflowJobList, ProviderError> {
        let url = format!("{}/workflow/{workflow}/job", self.api_url);
        let mut jobs = Vec::new();
        let mut page_token: Option<String> = None;
        for number in 1..=MAX_PAGES {
            let mut request = self.http.get(&url);
            if let Some(token) = &page_token {
                request = request.query(&[("page-token", token)]);
            }
            let page: WorkflowJobsPage = send_json("list workflow jobs", request).await?;
            for item in page.items {
                let id = JobId::new(item.id)
                    .ok_or_else(|| malformed("list workflow jobs", "job with empty id"))?;
                jobs.push(JobSummary::new(id, item.name));
            }
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
            if number == MAX_PAGES {
                warn!(pages = MAX_PAGES, count = jobs.len(), "workflow job listing truncated");
            }
        }
        Ok(WorkflowJobList {
            workflow_id: workflow.clone(),
            jobs,
        })
    }
}
