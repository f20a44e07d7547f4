//! The preview pipeline: status poll, artifact lookup, comment.
//!
//! ```text
//! Start → Polling(status) ─found→ Polling(artifacts) ─found→ ComposeSuccess ─┐
//!                 └exhausted→ Fallback ←─exhausted─┘                          │
//!                               └──────────────→ Commenting → Done ←──────────┘
//! ```
//!
//! No state is revisited. Lookup failures never escape [`PreviewPipeline::run`];
//! they select the fallback body instead. Only the comment write can fail the
//! invocation.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::compose::{
    artifacts_missing_comment, status_missing_comment, success_comment, CommentContext,
};
use crate::{
    ArtifactLocator, CommentProvider, CommentUpserter, CommitSha, CommitStatusProvider,
    JobProvider, LocateError, LocatedArtifacts, PollError, PreviewConfig, PreviewError,
    PullRequestId, StatusPoller, UpsertOutcome,
};

/// What a single invocation is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    pub commit: CommitSha,
    pub pull_request: PullRequestId,
    /// Link to the workflow run driving this invocation, quoted in every comment.
    pub workflow_run_url: String,
}

/// Why the fallback comment was posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    StatusMissing(PollError),
    ArtifactsMissing(LocateError),
}

/// Which path the pipeline took, and the comment it wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOutcome {
    Published {
        artifacts: LocatedArtifacts,
        comment: UpsertOutcome,
    },
    Fallback {
        reason: FallbackReason,
        comment: UpsertOutcome,
    },
}

impl PreviewOutcome {
    pub fn comment(&self) -> UpsertOutcome {
        match self {
            Self::Published { comment, .. } | Self::Fallback { comment, .. } => *comment,
        }
    }
}

enum Composed {
    Success(LocatedArtifacts),
    Fallback(FallbackReason),
}

/// Wires the three components together for one invocation.
pub struct PreviewPipeline {
    config: PreviewConfig,
    poller: StatusPoller,
    locator: ArtifactLocator,
    upserter: CommentUpserter,
}

impl PreviewPipeline {
    /// Validates `config` and builds the components around the given providers.
    pub fn new(
        config: PreviewConfig,
        statuses: Arc<dyn CommitStatusProvider>,
        jobs: Arc<dyn JobProvider>,
        comments: Arc<dyn CommentProvider>,
    ) -> Result<Self, PreviewError> {
        config.validate()?;
        Ok(Self {
            poller: StatusPoller::new(statuses, &config),
            locator: ArtifactLocator::new(jobs, &config),
            upserter: CommentUpserter::new(comments, &config),
            config,
        })
    }

    /// Runs the pipeline once and posts exactly one comment write.
    #[instrument(
        skip(self, request),
        fields(commit = %request.commit, pull_request = %request.pull_request)
    )]
    pub async fn run(&self, request: &PreviewRequest) -> Result<PreviewOutcome, PreviewError> {
        let composed = match self
            .poller
            .locate_job(&request.commit, &self.config.build_job_name)
            .await
        {
            Err(err) => {
                warn!(error = %err, "status lookup failed, posting fallback comment");
                Composed::Fallback(FallbackReason::StatusMissing(err))
            }
            Ok(job) => match self.locator.locate_artifacts(&job).await {
                Ok(artifacts) => Composed::Success(artifacts),
                Err(err) => {
                    warn!(error = %err, "artifact lookup failed, posting fallback comment");
                    Composed::Fallback(FallbackReason::ArtifactsMissing(err))
                }
            },
        };

        let ctx = CommentContext {
            commit: &request.commit,
            build_job_name: &self.config.build_job_name,
            workflow_run_url: &request.workflow_run_url,
        };
        let body = match &composed {
            Composed::Success(artifacts) => success_comment(ctx, artifacts),
            Composed::Fallback(FallbackReason::StatusMissing(err)) => {
                status_missing_comment(ctx, err)
            }
            Composed::Fallback(FallbackReason::ArtifactsMissing(err)) => {
                artifacts_missing_comment(ctx, err)
            }
        };

        let comment = self
            .upserter
            .upsert(request.pull_request, &body)
            .await
            .map_err(PreviewError::CommentWrite)?;
        info!(comment = %comment.comment_id(), "preview comment written");

        Ok(match composed {
            Composed::Success(artifacts) => PreviewOutcome::Published { artifacts, comment },
            Composed::Fallback(reason) => PreviewOutcome::Fallback { reason, comment },
        })
    }
}
