//! Core domain for the documentation preview commenter.
//!
//! Given a commit and a pull request, the pipeline finds the CI job that
//! builds the documentation, correlates it across two CI providers to derive
//! preview URLs, and keeps a single marked comment on the pull request up to
//! date. Infrastructure crates implement the port traits defined here; they
//! never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate performs no I/O of its
//! own. It defines *what* is needed; infrastructure crates define *how* to
//! supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype domain identifiers (`CommitSha`, `JobId`, etc.) |
//! | [`types`] | Provider snapshots (`CommitStatusEntry`, `Job`, `Comment`, etc.) |
//! | [`errors`] | Error and retry-policy types |
//! | [`config`] | `PreviewConfig` and retry schedules |
//! | [`ports`] | Provider traits implemented by the `github` and `circleci` crates |
//! | [`search`] | First-match lookup shared by every scan |
//! | [`status_poller`] | Waits for the build's commit status |
//! | [`artifact_locator`] | Resolves the build job and its artifact URLs |
//! | [`comment_upserter`] | Creates or replaces the marked comment |
//! | [`compose`] | Comment bodies |
//! | [`preview`] | The pipeline driver |

pub mod artifact_locator;
pub mod comment_upserter;
pub mod compose;
pub mod config;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod preview;
pub mod search;
pub mod status_poller;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use artifact_locator::{ArtifactLocator, ArtifactUrls, LocatedArtifacts};
pub use comment_upserter::{with_marker, CommentUpserter, UpsertOutcome, COMMENT_MARKER};
pub use compose::workflow_run_url;
pub use config::{PreviewConfig, RetrySchedule, DEFAULT_BUILD_JOB_NAME};
pub use errors::{LocateError, PollError, PreviewError, ProviderError, RetryPolicy};
pub use identifiers::{
    CommentId, CommitSha, InvocationId, JobId, PullRequestId, RepositoryId, WorkflowId,
    WorkflowRunId,
};
pub use ports::{CommentProvider, CommitStatusProvider, JobProvider};
pub use preview::{FallbackReason, PreviewOutcome, PreviewPipeline, PreviewRequest};
pub use search::find_first;
pub use status_poller::StatusPoller;
pub use types::{Comment, CommitStatusEntry, Job, JobSummary, WorkflowJobList};
