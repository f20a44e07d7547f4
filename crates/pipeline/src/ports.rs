//! Port traits implemented by infrastructure crates.
//!
//! The pipeline defines *what* it needs from each provider; the `github` and
//! `circleci` crates define *how* to supply it. All traits are dyn-compatible
//! so components can hold `Arc<dyn ...>` and tests can swap in fakes.

use async_trait::async_trait;

use crate::{
    Comment, CommitSha, CommitStatusEntry, Job, JobId, ProviderError, PullRequestId,
    RepositoryId, WorkflowId, WorkflowJobList,
};

/// Reads the statuses posted on a commit.
#[async_trait]
pub trait CommitStatusProvider: Send + Sync {
    /// Returns every status currently posted on `sha`, in provider order.
    async fn list_statuses(
        &self,
        repository: &RepositoryId,
        sha: &CommitSha,
    ) -> Result<Vec<CommitStatusEntry>, ProviderError>;
}

/// Reads jobs and workflows from the CI system that hosts the artifacts.
#[async_trait]
pub trait JobProvider: Send + Sync {
    /// Fetches one job's details.
    async fn get_job(&self, repository: &RepositoryId, job: &JobId)
        -> Result<Job, ProviderError>;

    /// Fetches the complete job list of a workflow.
    async fn list_workflow_jobs(
        &self,
        workflow: &WorkflowId,
    ) -> Result<WorkflowJobList, ProviderError>;
}

/// Reads and writes pull request comments.
#[async_trait]
pub trait CommentProvider: Send + Sync {
    /// Returns every comment on the pull request, oldest first.
    async fn list_comments(
        &self,
        repository: &RepositoryId,
        pull_request: PullRequestId,
    ) -> Result<Vec<Comment>, ProviderError>;

    /// Posts a new comment.
    async fn create_comment(
        &self,
        repository: &RepositoryId,
        pull_request: PullRequestId,
        body: &str,
    ) -> Result<Comment, ProviderError>;

    /// Replaces the body of an existing comment.
    async fn update_comment(&self, comment: &Comment, body: &str)
        -> Result<Comment, ProviderError>;
}
