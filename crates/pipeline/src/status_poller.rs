//! Waits for the documentation build's commit status and extracts its job id.
//!
//! The status provider populates statuses asynchronously, so an absent check
//! is the normal case for the first few seconds after a push. The poller asks
//! a bounded number of times with a fixed sleep in between and returns as soon
//! as the check shows up.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::{
    find_first, CommitSha, CommitStatusProvider, JobId, PollError, PreviewConfig, RepositoryId,
    RetrySchedule,
};

/// Locates the CI job behind a named commit status.
pub struct StatusPoller {
    provider: Arc<dyn CommitStatusProvider>,
    repository: RepositoryId,
    schedule: RetrySchedule,
}

impl StatusPoller {
    pub fn new(provider: Arc<dyn CommitStatusProvider>, config: &PreviewConfig) -> Self {
        Self {
            provider,
            repository: config.repository.clone(),
            schedule: config.status_retry,
        }
    }

    /// Returns the job id of the first status whose context ends with
    /// `check_name`.
    ///
    /// Makes at most `max_attempts` requests (never fewer than one). A
    /// retryable provider failure counts as an unsuccessful attempt; a
    /// non-retryable one ends polling immediately.
    #[instrument(skip(self), fields(repository = %self.repository))]
    pub async fn locate_job(
        &self,
        commit: &CommitSha,
        check_name: &str,
    ) -> Result<JobId, PollError> {
        let max_attempts = self.schedule.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let delay = match self.provider.list_statuses(&self.repository, commit).await {
                Ok(statuses) => {
                    debug!(attempt, count = statuses.len(), "fetched commit statuses");
                    if let Some(status) = find_first(&statuses, |s| s.matches_check(check_name)) {
                        let job = job_id_from_target_url(&status.target_url)?;
                        info!(attempt, context = %status.context, job = %job, "found job status");
                        return Ok(job);
                    }
                    info!(attempt, "waiting for {check_name} job status to be available");
                    self.schedule.interval
                }
                Err(err) => {
                    let policy = err.retry_policy();
                    if !policy.is_retryable() {
                        return Err(err.into());
                    }
                    warn!(attempt, error = %err, "failed to fetch commit statuses");
                    self.schedule.delay_for(&policy)
                }
            };

            if attempt >= max_attempts {
                warn!(attempts = attempt, "could not find {check_name} job status");
                return Err(PollError::NotFound {
                    check_name: check_name.to_string(),
                    attempts: attempt,
                });
            }
            sleep(delay).await;
        }
    }
}

/// Extracts the job id from a status target URL: its last path segment.
///
/// Query strings and fragments are ignored, so
/// `https://circleci.com/gh/org/repo/123?utm_source=github` yields `123`.
pub fn job_id_from_target_url(target_url: &str) -> Result<JobId, PollError> {
    let invalid = || PollError::InvalidTargetUrl {
        target_url: target_url.to_string(),
    };
    let url = Url::parse(target_url).map_err(|_| invalid())?;
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|segment| JobId::new(segment))
        .ok_or_else(invalid)
}
