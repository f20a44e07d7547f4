//! Command-line arguments and their translation into pipeline and adapter settings.

use std::time::Duration;

use circleci::CircleCiClientConfig;
use clap::{Parser, ValueEnum};
use github::GithubClientConfig;
use pipeline::{
    workflow_run_url, CommitSha, PreviewConfig, PreviewRequest, PullRequestId, RepositoryId,
    RetrySchedule, WorkflowRunId, DEFAULT_BUILD_JOB_NAME,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Post or update the documentation preview comment on a pull request.
#[derive(Debug, Parser)]
#[command(name = "preview-docs", version)]
pub struct Args {
    /// Commit whose `build_doc` status is polled
    #[arg(long, env = "PREVIEW_COMMIT_SHA", value_parser = parse_commit)]
    pub commit_sha: CommitSha,

    /// Pull request receiving the comment
    #[arg(long, env = "PREVIEW_PULL_NUMBER")]
    pub pull_number: u64,

    /// GitHub Actions run linked from every comment
    #[arg(long, env = "PREVIEW_WORKFLOW_RUN_ID")]
    pub workflow_run_id: u64,

    /// Repository in owner/name form
    #[arg(long, env = "PREVIEW_REPO", default_value = "mlflow/mlflow", value_parser = parse_repository)]
    pub repo: RepositoryId,

    /// Name of the CircleCI job that builds the docs
    #[arg(long, env = "PREVIEW_BUILD_JOB_NAME", default_value = DEFAULT_BUILD_JOB_NAME)]
    pub build_job_name: String,

    #[arg(long, env = "PREVIEW_GITHUB_API_URL", default_value = github::DEFAULT_API_URL)]
    pub github_api_url: String,

    /// Used for the workflow run link
    #[arg(long, env = "PREVIEW_GITHUB_WEB_URL", default_value = "https://github.com")]
    pub github_web_url: String,

    #[arg(long, env = "PREVIEW_CIRCLECI_API_URL", default_value = circleci::DEFAULT_API_URL)]
    pub circleci_api_url: String,

    /// VCS prefix of the CircleCI project slug
    #[arg(long, env = "PREVIEW_CIRCLECI_VCS", default_value = "gh")]
    pub circleci_vcs: String,

    #[arg(long, env = "PREVIEW_STATUS_ATTEMPTS", default_value_t = 5)]
    pub status_attempts: u32,

    #[arg(long, env = "PREVIEW_STATUS_INTERVAL_SECS", default_value_t = 3)]
    pub status_interval_secs: u64,

    #[arg(long, env = "PREVIEW_ARTIFACT_ATTEMPTS", default_value_t = 5)]
    pub artifact_attempts: u32,

    #[arg(long, env = "PREVIEW_ARTIFACT_INTERVAL_SECS", default_value_t = 1)]
    pub artifact_interval_secs: u64,

    /// Per-request HTTP timeout
    #[arg(long, env = "PREVIEW_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "PREVIEW_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    #[arg(long, env = "CIRCLE_TOKEN", hide_env_values = true)]
    pub circle_token: Option<String>,
}

fn parse_commit(value: &str) -> Result<CommitSha, String> {
    CommitSha::new(value.trim()).ok_or_else(|| "commit SHA must not be empty".to_string())
}

fn parse_repository(value: &str) -> Result<RepositoryId, String> {
    RepositoryId::new(value.trim()).ok_or_else(|| format!("`{value}` is not in owner/name form"))
}

impl Args {
    pub fn preview_config(&self) -> PreviewConfig {
        PreviewConfig::new(self.repo.clone())
            .with_build_job_name(self.build_job_name.clone())
            .with_status_retry(RetrySchedule::new(
                self.status_attempts,
                Duration::from_secs(self.status_interval_secs),
            ))
            .with_artifact_retry(RetrySchedule::new(
                self.artifact_attempts,
                Duration::from_secs(self.artifact_interval_secs),
            ))
    }

    pub fn request(&self) -> PreviewRequest {
        PreviewRequest {
            commit: self.commit_sha.clone(),
            pull_request: PullRequestId::new(self.pull_number),
            workflow_run_url: workflow_run_url(
                &self.github_web_url,
                &self.repo,
                WorkflowRunId::new(self.workflow_run_id),
            ),
        }
    }

    pub fn github_config(&self) -> GithubClientConfig {
        GithubClientConfig {
            api_url: self.github_api_url.clone(),
            token: self.github_token.clone(),
            request_timeout: self.request_timeout(),
        }
    }

    pub fn circleci_config(&self) -> CircleCiClientConfig {
        CircleCiClientConfig {
            api_url: self.circleci_api_url.clone(),
            vcs: self.circleci_vcs.clone(),
            token: self.circle_token.clone(),
            request_timeout: self.request_timeout(),
        }
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
