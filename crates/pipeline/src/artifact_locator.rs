//! Resolves the documentation build job and derives its artifact URLs.
//!
//! The job id taken from the commit status is not necessarily the job whose
//! artifacts we want, and the job provider uses a different id scheme for
//! artifact hosting. The locator therefore walks up to the job's workflow and
//! back down to the sibling job named after the build job.
//!
//! Each attempt is the pair of fetches (job, then workflow job list). A
//! failure in either discards the whole attempt; nothing from a half-finished
//! attempt is reused except the job's web URL, which is kept for diagnostics.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::{
    Job, JobId, JobProvider, LocateError, PreviewConfig, ProviderError, RepositoryId,
    RetrySchedule, WorkflowJobList,
};

/// Host and path prefix under which the job provider serves job artifacts.
pub const ARTIFACT_HOST: &str = "https://output.circle-artifacts.com/output/job";

const ARTIFACT_DIR: &str = "artifacts/0/docs/build/latest";
const TOP_PAGE_FILE: &str = "index.html";
const CHANGED_PAGES_FILE: &str = "diff.html";

// ---------------------------------------------------------------------------
// Artifact URLs
// ---------------------------------------------------------------------------

/// Links to the two preview pages produced by the documentation build.
///
/// Derived purely from the build job's id. Whether the files exist yet is not
/// checked: until the upload finishes the links answer 404.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactUrls {
    /// Landing page of the rendered documentation.
    pub top_page: String,
    /// Page listing the documentation pages changed by the pull request.
    pub changed_pages: String,
}

impl ArtifactUrls {
    /// Builds the artifact URLs for `job`.
    pub fn for_job(job: &JobId) -> Self {
        let artifact = |file: &str| format!("{ARTIFACT_HOST}/{job}/{ARTIFACT_DIR}/{file}");
        Self {
            top_page: artifact(TOP_PAGE_FILE),
            changed_pages: artifact(CHANGED_PAGES_FILE),
        }
    }
}

/// Everything the success comment needs to know about the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedArtifacts {
    /// Web page of the job found through the commit status.
    pub job_url: String,
    /// The workflow job named after the build job.
    pub build_job: JobId,
    pub urls: ArtifactUrls,
}

// ---------------------------------------------------------------------------
// Locator
// ---------------------------------------------------------------------------

struct FailedAttempt {
    job_url: Option<String>,
    error: ProviderError,
}

/// Correlates a polled job with its workflow's build job.
pub struct ArtifactLocator {
    provider: Arc<dyn JobProvider>,
    repository: RepositoryId,
    build_job_name: String,
    schedule: RetrySchedule,
}

impl ArtifactLocator {
    pub fn new(provider: Arc<dyn JobProvider>, config: &PreviewConfig) -> Self {
        Self {
            provider,
            repository: config.repository.clone(),
            build_job_name: config.build_job_name.clone(),
            schedule: config.artifact_retry,
        }
    }

    /// Resolves the artifact URLs of the build job in `job`'s workflow.
    ///
    /// Transient provider failures are retried up to `max_attempts` times in
    /// total. The last job web URL seen is carried in
    /// [`LocateError::CorrelationFailed`].
    #[instrument(skip(self), fields(repository = %self.repository))]
    pub async fn locate_artifacts(&self, job: &JobId) -> Result<LocatedArtifacts, LocateError> {
        let max_attempts = self.schedule.max_attempts.max(1);
        let mut last_job_url = None;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let failed = match self.fetch_workflow(job).await {
                Ok((details, workflow)) => return self.resolve(details, &workflow),
                Err(failed) => failed,
            };
            if failed.job_url.is_some() {
                last_job_url = failed.job_url;
            }

            let policy = failed.error.retry_policy();
            if !policy.is_retryable() {
                warn!(attempt, error = %failed.error, "failed to get job info, giving up");
                return Err(LocateError::Provider {
                    error: failed.error,
                    job_url: last_job_url,
                });
            }
            if attempt >= max_attempts {
                warn!(attempts = attempt, error = %failed.error, "failed to get job info");
                return Err(LocateError::CorrelationFailed {
                    attempts: attempt,
                    last_job_url,
                    last_error: failed.error,
                });
            }
            warn!(attempt, error = %failed.error, "failed to get job info, retrying");
            sleep(self.schedule.delay_for(&policy)).await;
        }
    }

    /// One attempt: job details, then the full job list of its workflow.
    async fn fetch_workflow(&self, job: &JobId) -> Result<(Job, WorkflowJobList), FailedAttempt> {
        let details = self
            .provider
            .get_job(&self.repository, job)
            .await
            .map_err(|error| FailedAttempt {
                job_url: None,
                error,
            })?;
        debug!(workflow = %details.workflow_id, web_url = %details.web_url, "fetched job");

        match self.provider.list_workflow_jobs(&details.workflow_id).await {
            Ok(workflow) => Ok((details, workflow)),
            Err(error) => Err(FailedAttempt {
                job_url: Some(details.web_url),
                error,
            }),
        }
    }

    fn resolve(
        &self,
        details: Job,
        workflow: &WorkflowJobList,
    ) -> Result<LocatedArtifacts, LocateError> {
        let Some(build_job) = workflow.find_by_name(&self.build_job_name) else {
            warn!(
                workflow = %workflow.workflow_id,
                jobs = workflow.jobs.len(),
                "workflow has no {} job", self.build_job_name
            );
            return Err(LocateError::SiblingJobMissing {
                job_name: self.build_job_name.clone(),
                workflow_id: workflow.workflow_id.clone(),
                job_url: details.web_url,
            });
        };

        info!(polled = %details.id, build_job = %build_job.id, "resolved build job");
        Ok(LocatedArtifacts {
            job_url: details.web_url,
            urls: ArtifactUrls::for_job(&build_job.id),
            build_job: build_job.id.clone(),
        })
    }
}
