//! Provider snapshots the pipeline reads.
//!
//! Every value here is fetched fresh per invocation and never persisted.
//! Infrastructure adapters decode their wire formats and hand the pipeline
//! these types; nothing in this crate sees raw JSON.

use serde::{Deserialize, Serialize};

use crate::{CommentId, JobId, WorkflowId};

// ---------------------------------------------------------------------------
// Commit statuses
// ---------------------------------------------------------------------------

/// One status entry posted on a commit by an external check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatusEntry {
    /// Provider-qualified check name, e.g. `"ci/circleci: build_doc"`.
    pub context: String,

    /// Link to the check's details page. Empty when the provider sent none.
    pub target_url: String,
}

impl CommitStatusEntry {
    /// Creates a status entry.
    pub fn new(context: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            target_url: target_url.into(),
        }
    }

    /// Returns `true` if this entry's context ends with `check_name`.
    pub fn matches_check(&self, check_name: &str) -> bool {
        self.context.ends_with(check_name)
    }
}

// ---------------------------------------------------------------------------
// Jobs and workflows
// ---------------------------------------------------------------------------

/// Details of a single CI job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// The id the job was requested by.
    pub id: JobId,

    /// Human-facing page for the job.
    pub web_url: String,

    /// The workflow the job most recently ran in.
    pub workflow_id: WorkflowId,
}

/// One entry of a workflow's job list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    pub name: String,
}

impl JobSummary {
    /// Creates a job summary.
    pub fn new(id: JobId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// All jobs of one workflow, in provider order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowJobList {
    pub workflow_id: WorkflowId,
    pub jobs: Vec<JobSummary>,
}

impl WorkflowJobList {
    /// Returns the first job named exactly `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&JobSummary> {
        crate::find_first(&self.jobs, |job| job.name == name)
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// An issue comment on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,

    /// API URL of the comment; updates are sent here.
    pub url: String,

    pub body: String,
}

impl Comment {
    /// Returns `true` if `marker` appears anywhere in the body.
    pub fn carries_marker(&self, marker: &str) -> bool {
        self.body.contains(marker)
    }
}
