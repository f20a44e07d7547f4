//! GitHub response shapes, reduced to the fields the pipeline reads.

use pipeline::{Comment, CommentId, CommitStatusEntry};
use serde::Deserialize;

/// `GET /repos/{repo}/commits/{sha}/status`
#[derive(Debug, Deserialize)]
pub(crate) struct CombinedStatus {
    pub statuses: Vec<Status>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Status {
    pub context: String,
    /// GitHub sends `null` for statuses posted without a link.
    pub target_url: Option<String>,
}

impl From<Status> for CommitStatusEntry {
    fn from(status: Status) -> Self {
        CommitStatusEntry::new(status.context, status.target_url.unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueComment {
    pub id: u64,
    pub url: String,
    pub body: Option<String>,
}

impl From<IssueComment> for Comment {
    fn from(comment: IssueComment) -> Self {
        Comment {
            id: CommentId::new(comment.id),
            url: comment.url,
            body: comment.body.unwrap_or_default(),
        }
    }
}
