//! Keeps exactly one preview comment per pull request.
//!
//! Ownership is defined by [`COMMENT_MARKER`]: the first comment whose body
//! contains it is the managed comment. Every body written is prefixed with the
//! marker, so the next invocation finds and replaces the same comment.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    find_first, CommentId, CommentProvider, PreviewConfig, ProviderError, PullRequestId,
    RepositoryId,
};

/// Hidden HTML comment identifying the comment managed by this tool.
pub const COMMENT_MARKER: &str = "<!-- documentation preview -->";

/// Which write [`CommentUpserter::upsert`] performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(CommentId),
    Updated(CommentId),
}

impl UpsertOutcome {
    pub fn comment_id(self) -> CommentId {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }
}

/// Prefixes `body` with the marker and a blank line.
pub fn with_marker(body: &str) -> String {
    format!("{COMMENT_MARKER}\n\n{body}")
}

pub struct CommentUpserter {
    provider: Arc<dyn CommentProvider>,
    repository: RepositoryId,
}

impl CommentUpserter {
    pub fn new(provider: Arc<dyn CommentProvider>, config: &PreviewConfig) -> Self {
        Self {
            provider,
            repository: config.repository.clone(),
        }
    }

    /// Creates the managed comment, or replaces its body if it already exists.
    ///
    /// Not retried; any provider failure is returned as is. Two concurrent
    /// invocations on one pull request can both miss the comment and both
    /// create one.
    #[instrument(skip(self, body), fields(repository = %self.repository))]
    pub async fn upsert(
        &self,
        pull_request: PullRequestId,
        body: &str,
    ) -> Result<UpsertOutcome, ProviderError> {
        let comments = self
            .provider
            .list_comments(&self.repository, pull_request)
            .await?;
        let body = with_marker(body);

        match find_first(&comments, |c| c.carries_marker(COMMENT_MARKER)) {
            None => {
                info!("creating comment");
                let created = self
                    .provider
                    .create_comment(&self.repository, pull_request, &body)
                    .await?;
                Ok(UpsertOutcome::Created(created.id))
            }
            Some(existing) => {
                info!(comment = %existing.id, "updating comment");
                let updated = self.provider.update_comment(existing, &body).await?;
                Ok(UpsertOutcome::Updated(updated.id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryComments;

    fn upserter(store: &Arc<InMemoryComments>) -> CommentUpserter {
        let config = PreviewConfig::new(RepositoryId::new("mlflow/mlflow").unwrap());
        CommentUpserter::new(store.clone(), &config)
    }

    fn pr() -> PullRequestId {
        PullRequestId::new(7)
    }

    fn marked(bodies: &[String]) -> Vec<&String> {
        bodies.iter().filter(|b| b.contains(COMMENT_MARKER)).collect()
    }

    #[tokio::test]
    async fn creates_marked_comment_when_none_exists() {
        let store = Arc::new(InMemoryComments::with_bodies(&["LGTM"]));

        let outcome = upserter(&store).upsert(pr(), "preview here").await.unwrap();

        assert!(matches!(outcome, UpsertOutcome::Created(_)));
        let bodies = store.bodies();
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[1], "<!-- documentation preview -->\n\npreview here");
    }

    #[tokio::test]
    async fn second_upsert_replaces_first() {
        let store = Arc::new(InMemoryComments::new());
        let upserter = upserter(&store);

        let first = upserter.upsert(pr(), "B1").await.unwrap();
        let second = upserter.upsert(pr(), "B2").await.unwrap();

        assert!(matches!(first, UpsertOutcome::Created(_)));
        assert_eq!(second, UpsertOutcome::Updated(first.comment_id()));
        let bodies = store.bodies();
        assert_eq!(marked(&bodies), vec![&with_marker("B2")]);
        assert_eq!((store.creates(), store.updates()), (1, 1));
    }

    #[tokio::test]
    async fn marker_is_recognised_anywhere_in_body() {
        let store = Arc::new(InMemoryComments::with_bodies(&[
            "unrelated",
            "edited by a human <!-- documentation preview --> trailing text",
        ]));

        let outcome = upserter(&store).upsert(pr(), "fresh").await.unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated(CommentId::new(2)));
        assert_eq!(store.bodies(), vec!["unrelated".to_string(), with_marker("fresh")]);
    }

    #[tokio::test]
    async fn only_first_marked_comment_is_touched() {
        let store = Arc::new(InMemoryComments::with_bodies(&[
            "<!-- documentation preview -->\n\nold",
            "<!-- documentation preview -->\n\nolder duplicate",
        ]));

        let outcome = upserter(&store).upsert(pr(), "new").await.unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated(CommentId::new(1)));
        assert_eq!(store.bodies()[1], "<!-- documentation preview -->\n\nolder duplicate");
    }

    #[tokio::test]
    async fn write_failure_is_returned() {
        let store = Arc::new(InMemoryComments::new().failing_writes());

        let err = upserter(&store).upsert(pr(), "body").await.unwrap_err();

        assert!(matches!(err, ProviderError::Status { status: 500, .. }));
        assert!(store.bodies().is_empty());
    }
}
