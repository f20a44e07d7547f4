//! In-memory provider fakes for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    Comment, CommentId, CommentProvider, CommitSha, CommitStatusEntry, CommitStatusProvider, Job,
    JobId, JobProvider, JobSummary, ProviderError, PullRequestId, RepositoryId, WorkflowId,
    WorkflowJobList,
};

pub(crate) fn job_id(id: &str) -> JobId {
    JobId::new(id).unwrap()
}

pub(crate) fn http_error(operation: &str, status: u16) -> ProviderError {
    ProviderError::Status {
        operation: operation.into(),
        status,
        body: "Permission denied".into(),
        retry_after_secs: None,
    }
}

pub(crate) fn malformed(operation: &str) -> ProviderError {
    ProviderError::MalformedResponse {
        operation: operation.into(),
        message: "expected value at line 1 column 1".into(),
    }
}

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

/// Replays scripted responses, then keeps answering with `steady`.
pub(crate) struct ScriptedStatuses {
    script: Mutex<VecDeque<Result<Vec<CommitStatusEntry>, ProviderError>>>,
    steady: Vec<CommitStatusEntry>,
    calls: AtomicU32,
}

impl ScriptedStatuses {
    /// A provider whose status list never contains anything.
    pub(crate) fn never() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub(crate) fn new(
        script: Vec<Result<Vec<CommitStatusEntry>, ProviderError>>,
        steady: Vec<CommitStatusEntry>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            steady,
            calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommitStatusProvider for ScriptedStatuses {
    async fn list_statuses(
        &self,
        _repository: &RepositoryId,
        _sha: &CommitSha,
    ) -> Result<Vec<CommitStatusEntry>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.steady.clone()))
    }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// A job provider that fails with queued errors before answering normally.
pub(crate) struct FlakyJobs {
    job: Job,
    workflow: WorkflowJobList,
    job_failures: Mutex<VecDeque<ProviderError>>,
    workflow_failures: Mutex<VecDeque<ProviderError>>,
    job_calls: AtomicU32,
    workflow_calls: AtomicU32,
}

impl FlakyJobs {
    /// A workflow `wf-1` whose polled job is `polled` and which contains `jobs`.
    pub(crate) fn new(polled: &str, jobs: &[(&str, &str)]) -> Self {
        let workflow_id = WorkflowId::new("wf-1").unwrap();
        Self {
            job: Job {
                id: job_id(polled),
                web_url: format!("https://circleci.test/jobs/{polled}"),
                workflow_id: workflow_id.clone(),
            },
            workflow: WorkflowJobList {
                workflow_id,
                jobs: jobs
                    .iter()
                    .map(|(id, name)| JobSummary::new(job_id(id), *name))
                    .collect(),
            },
            job_failures: Mutex::new(VecDeque::new()),
            workflow_failures: Mutex::new(VecDeque::new()),
            job_calls: AtomicU32::new(0),
            workflow_calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn failing_jobs(self, errors: impl IntoIterator<Item = ProviderError>) -> Self {
        self.job_failures.lock().unwrap().extend(errors);
        self
    }

    pub(crate) fn failing_workflows(self, errors: impl IntoIterator<Item = ProviderError>) -> Self {
        self.workflow_failures.lock().unwrap().extend(errors);
        self
    }

    pub(crate) fn job_calls(&self) -> u32 {
        self.job_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn workflow_calls(&self) -> u32 {
        self.workflow_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn job_url(&self) -> &str {
        &self.job.web_url
    }
}

#[async_trait]
impl JobProvider for FlakyJobs {
    async fn get_job(&self, _repository: &RepositoryId, job: &JobId) -> Result<Job, ProviderError> {
        self.job_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.job_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(Job {
            id: job.clone(),
            ..self.job.clone()
        })
    }

    async fn list_workflow_jobs(
        &self,
        _workflow: &WorkflowId,
    ) -> Result<WorkflowJobList, ProviderError> {
        self.workflow_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.workflow_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(self.workflow.clone())
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// A single pull request's comment thread held in memory.
pub(crate) struct InMemoryComments {
    comments: Mutex<Vec<Comment>>,
    next_id: AtomicU64,
    creates: AtomicU32,
    updates: AtomicU32,
    fail_writes: bool,
}

impl InMemoryComments {
    pub(crate) fn new() -> Self {
        Self {
            comments: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            creates: AtomicU32::new(0),
            updates: AtomicU32::new(0),
            fail_writes: false,
        }
    }

    /// Seeds the thread with comments carrying the given bodies.
    pub(crate) fn with_bodies(bodies: &[&str]) -> Self {
        let store = Self::new();
        {
            let mut comments = store.comments.lock().unwrap();
            for body in bodies {
                let id = store.next_id.fetch_add(1, Ordering::SeqCst);
                comments.push(comment(id, body));
            }
        }
        store
    }

    pub(crate) fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub(crate) fn bodies(&self) -> Vec<String> {
        self.comments
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.body.clone())
            .collect()
    }

    pub(crate) fn writes(&self) -> u32 {
        self.creates.load(Ordering::SeqCst) + self.updates.load(Ordering::SeqCst)
    }

    pub(crate) fn creates(&self) -> u32 {
        self.creates.load(Ordering::SeqCst)
    }

    pub(crate) fn updates(&self) -> u32 {
        self.updates.load(Ordering::SeqCst)
    }
}

fn comment(id: u64, body: &str) -> Comment {
    Comment {
        id: CommentId::new(id),
        url: format!("https://api.github.test/repos/o/r/issues/comments/{id}"),
        body: body.to_string(),
    }
}

#[async_trait]
impl CommentProvider for InMemoryComments {
    async fn list_comments(
        &self,
        _repository: &RepositoryId,
        _pull_request: PullRequestId,
    ) -> Result<Vec<Comment>, ProviderError> {
        Ok(self.comments.lock().unwrap().clone())
    }

    async fn create_comment(
        &self,
        _repository: &RepositoryId,
        _pull_request: PullRequestId,
        body: &str,
    ) -> Result<Comment, ProviderError> {
        if self.fail_writes {
            return Err(http_error("create comment", 500));
        }
        self.creates.fetch_add(1, Ordering::SeqCst);
        let created = comment(self.next_id.fetch_add(1, Ordering::SeqCst), body);
        self.comments.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_comment(&self, target: &Comment, body: &str) -> Result<Comment, ProviderError> {
        if self.fail_writes {
            return Err(http_error("update comment", 500));
        }
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut comments = self.comments.lock().unwrap();
        let existing = comments
            .iter_mut()
            .find(|c| c.id == target.id)
            .ok_or_else(|| http_error("update comment", 404))?;
        existing.body = body.to_string();
        Ok(existing.clone())
    }
}
