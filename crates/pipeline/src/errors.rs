//! Error and retry-policy types for the preview pipeline.
//!
//! Errors are split by the stage that produces them:
//!
//! - [`ProviderError`]: a single request to an external provider failed.
//! - [`PollError`]: the status poller gave up.
//! - [`LocateError`]: the artifact locator gave up.
//! - [`PreviewError`]: the invocation itself failed. Only the final comment
//!   write (and invalid configuration) can produce one; every earlier failure
//!   is turned into a fallback comment.
//!
//! [`RetryPolicy`] is a cross-cutting concern: the bounded loops in
//! [`crate::StatusPoller`] and [`crate::ArtifactLocator`] consult it to decide
//! whether a provider failure is worth another attempt.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::WorkflowId;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// - `Retryable` errors: non-2xx responses (the job provider occasionally
///   answers a valid token with 403), connection failures, timeouts.
/// - `NonRetryable` errors: a 2xx body that does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    ///
    /// `after` optionally specifies the minimum delay before retrying. `None`
    /// means apply the caller's own fixed interval.
    Retryable {
        /// Minimum back-off before the next attempt.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

impl RetryPolicy {
    /// Returns `true` for [`RetryPolicy::Retryable`].
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }
}

// ---------------------------------------------------------------------------
// Provider errors
// ---------------------------------------------------------------------------

/// A single request to an external provider failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ProviderError {
    /// The provider answered with a non-success HTTP status.
    #[error("{operation} failed with HTTP {status}: {body}")]
    Status {
        /// Short description of the request, e.g. `"get job"`.
        operation: String,
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
        /// Value of the `Retry-After` header, if the provider sent one.
        retry_after_secs: Option<u64>,
    },

    /// The request never produced a response (connect error, timeout, ...).
    #[error("{operation} request failed: {message}")]
    Transport {
        operation: String,
        message: String,
    },

    /// The provider answered successfully but the body could not be decoded
    /// into the expected record.
    #[error("{operation} returned a malformed response: {message}")]
    MalformedResponse {
        operation: String,
        message: String,
    },
}

impl ProviderError {
    /// Classifies this error for the retry loops.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Status {
                retry_after_secs, ..
            } => RetryPolicy::Retryable {
                after: retry_after_secs.map(Duration::from_secs),
            },
            Self::Transport { .. } => RetryPolicy::Retryable { after: None },
            Self::MalformedResponse { .. } => RetryPolicy::NonRetryable,
        }
    }
}

// ---------------------------------------------------------------------------
// Stage errors
// ---------------------------------------------------------------------------

/// The status poller could not produce a job id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// No status whose context ends with `check_name` appeared in time.
    #[error("no '{check_name}' status after {attempts} attempts")]
    NotFound { check_name: String, attempts: u32 },

    /// A matching status was found but its target URL carries no job id.
    #[error("cannot extract a job id from status target URL '{target_url}'")]
    InvalidTargetUrl { target_url: String },

    /// The status provider failed in a way that retrying cannot fix.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// The artifact locator could not resolve the sibling job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    /// Every attempt of the job/workflow fetch failed.
    #[error("job lookup failed after {attempts} attempts: {last_error}")]
    CorrelationFailed {
        attempts: u32,
        /// Web URL of the polled job, if step (a) ever succeeded.
        last_job_url: Option<String>,
        last_error: ProviderError,
    },

    /// The workflow was fetched but contains no job with the build job's name.
    #[error("workflow {workflow_id} has no '{job_name}' job")]
    SiblingJobMissing {
        job_name: String,
        workflow_id: WorkflowId,
        job_url: String,
    },

    /// The job provider failed in a way that retrying cannot fix.
    #[error("{error}")]
    Provider {
        #[source]
        error: ProviderError,
        /// Web URL of the polled job, if step (a) ever succeeded.
        job_url: Option<String>,
    },
}

impl LocateError {
    /// Web URL of the polled job, when it is known.
    pub fn job_url(&self) -> Option<&str> {
        match self {
            Self::CorrelationFailed { last_job_url, .. } => last_job_url.as_deref(),
            Self::SiblingJobMissing { job_url, .. } => Some(job_url),
            Self::Provider { job_url, .. } => job_url.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Invocation errors
// ---------------------------------------------------------------------------

/// Errors that terminate an invocation.
///
/// Lookup failures have no variant here: they degrade into a fallback comment
/// and the invocation still succeeds.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// Listing, creating or updating the pull request comment failed.
    ///
    /// No retry and no fallback: there is nowhere left to report the problem.
    #[error("failed to write the preview comment: {0}")]
    CommentWrite(#[source] ProviderError),

    /// The pipeline configuration is invalid.
    ///
    /// Produced at construction; the pipeline never runs with an invalid config.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}
