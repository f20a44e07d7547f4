//! Pipeline configuration.
//!
//! Everything that used to be a module-level constant (repository, build job
//! name, attempt counts, sleep intervals) lives in [`PreviewConfig`] and is
//! handed to each component at construction.

use std::time::Duration;

use crate::{PreviewError, RepositoryId, RetryPolicy};

/// Default name of the CI job that builds the documentation.
pub const DEFAULT_BUILD_JOB_NAME: &str = "build_doc";

/// A bounded, fixed-interval retry schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySchedule {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// Sleep between two consecutive unsuccessful attempts.
    pub interval: Duration,
}

impl RetrySchedule {
    /// Creates a schedule.
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// A schedule that retries without sleeping.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Total time spent sleeping when every attempt fails and no provider
    /// asks for a longer back-off.
    pub fn worst_case_wait(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }

    /// Sleep before the next attempt after a failure classified as `policy`.
    ///
    /// A provider-requested back-off only ever lengthens the fixed interval,
    /// and is capped at [`MAX_PROVIDER_BACKOFF`].
    pub fn delay_for(&self, policy: &RetryPolicy) -> Duration {
        match policy {
            RetryPolicy::Retryable { after: Some(after) } => {
                self.interval.max((*after).min(MAX_PROVIDER_BACKOFF))
            }
            _ => self.interval,
        }
    }
}

/// Upper bound on a `Retry-After` delay honoured between attempts.
pub const MAX_PROVIDER_BACKOFF: Duration = Duration::from_secs(60);

/// Configuration shared by the three pipeline components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewConfig {
    /// Repository whose commit statuses and pull request comments are read.
    pub repository: RepositoryId,

    /// Name of the documentation build job. Matched as a suffix of status
    /// contexts and exactly against workflow job names.
    pub build_job_name: String,

    /// Schedule for waiting on the commit status to appear.
    pub status_retry: RetrySchedule,

    /// Schedule for the job/workflow fetch.
    pub artifact_retry: RetrySchedule,
}

impl PreviewConfig {
    /// Creates a configuration with the default job name and schedules
    /// (5 × 3 s for statuses, 5 × 1 s for artifacts).
    pub fn new(repository: RepositoryId) -> Self {
        Self {
            repository,
            build_job_name: DEFAULT_BUILD_JOB_NAME.to_string(),
            status_retry: RetrySchedule::new(5, Duration::from_secs(3)),
            artifact_retry: RetrySchedule::new(5, Duration::from_secs(1)),
        }
    }

    pub fn with_build_job_name(mut self, name: impl Into<String>) -> Self {
        self.build_job_name = name.into();
        self
    }

    pub fn with_status_retry(mut self, schedule: RetrySchedule) -> Self {
        self.status_retry = schedule;
        self
    }

    pub fn with_artifact_retry(mut self, schedule: RetrySchedule) -> Self {
        self.artifact_retry = schedule;
        self
    }

    /// Checks the configuration before any request is made.
    pub fn validate(&self) -> Result<(), PreviewError> {
        if self.build_job_name.trim().is_empty() {
            return Err(PreviewError::Configuration {
                message: "build job name must not be empty".into(),
            });
        }
        for (label, schedule) in [
            ("status", self.status_retry),
            ("artifact", self.artifact_retry),
        ] {
            if schedule.max_attempts == 0 {
                return Err(PreviewError::Configuration {
                    message: format!("{label} retry schedule needs at least one attempt"),
                });
            }
        }
        Ok(())
    }
}
