use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    Comment, CommentProvider, CommitSha, CommitStatusEntry, CommitStatusProvider, ProviderError,
    PullRequestId, RepositoryId,
};
use provider_http::send_json;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::wire::{CombinedStatus, IssueComment};

/// Public GitHub REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const PER_PAGE: u32 = 100;
const MAX_PAGES: u32 = 50;

/// Errors raised while constructing a [`GithubClient`].
#[derive(Debug, Error)]
pub enum GithubClientError {
    #[error("GitHub token contains characters not allowed in an HTTP header")]
    InvalidToken,

    #[error("failed to build GitHub HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Connection settings for [`GithubClient`].
#[derive(Debug, Clone)]
pub struct GithubClientConfig {
    /// API root, without a trailing slash.
    pub api_url: String,
    /// Personal access or workflow token. Requests are sent anonymously
    /// without one.
    pub token: Option<String>,
    pub request_timeout: Duration,
}

impl Default for GithubClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// GitHub REST client scoped to what the preview pipeline needs.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
}

impl GithubClient {
    pub fn new(config: GithubClientConfig) -> Result<Self, GithubClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("preview-docs"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        if let Some(token) = config.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("token {token}"))
                .map_err(|_| GithubClientError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn comments_url(&self, repository: &RepositoryId, pull_request: PullRequestId) -> String {
        format!(
            "{}/repos/{repository}/issues/{pull_request}/comments",
            self.api_url
        )
    }
}

#[async_trait]
impl CommitStatusProvider for GithubClient {
    async fn list_statuses(
        &self,
        repository: &RepositoryId,
        sha: &CommitSha,
    ) -> Result<Vec<CommitStatusEntry>, ProviderError> {
        let url = format!("{}/repos/{repository}/commits/{sha}/status", self.api_url);
        let combined: CombinedStatus = send_json(
            "list commit statuses",
            self.http.get(url).query(&[("per_page", PER_PAGE)]),
        )
        .await?;
        Ok(combined.statuses.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentProvider for GithubClient {
    async fn list_comments(
        &self,
        repository: &RepositoryId,
        pull_request: PullRequestId,
    ) -> Result<Vec<Comment>, ProviderError> {
        let url = self.comments_url(repository, pull_request);
        let mut comments = Vec::new();
        for page in 1..=MAX_PAGES {
            let chunk: Vec<IssueComment> = send_json(
                "list comments",
                self.http
                    .get(&url)
                    .query(&[("per_page", PER_PAGE), ("page", page)]),
            )
            .await?;
            let full_page = chunk.len() >= PER_PAGE as usize;
            comments.extend(chunk.into_iter().map(Comment::from));
            if !full_page {
                break;
            }
            if page == MAX_PAGES {
                warn!(
                    pages = MAX_PAGES,
                    count = comments.len(),
                    "comment listing truncated, later comments are not searched"
                );
            }
        }
        debug!(count = comments.len(), "listed pull request comments");
        Ok(comments)
    }

    async fn create_comment(
        &self,
        repository: &RepositoryId,
        pull_request: PullRequestId,
        body: &str,
    ) -> Result<Comment, ProviderError> {
        let request = self
            .http
            .post(self.comments_url(repository, pull_request))
            .json(&json!({ "body": body }));
        let created: IssueComment = send_json("create comment", request).await?;
        Ok(created.into())
    }

    async fn update_comment(&self, comment: &Comment, body: &str) -> Result<Comment, ProviderError> {
        let request = self
            .http
            .patch(&comment.url)
            .json(&json!({ "body": body }));
        let updated: IssueComment = send_json("update comment", request).await?;
        Ok(updated.into())
    }
}
