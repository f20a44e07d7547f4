//! Comment bodies for the success and fallback paths.
//!
//! The marker is not part of these bodies; [`crate::CommentUpserter`] adds it.

use crate::{CommitSha, LocateError, LocatedArtifacts, PollError, RepositoryId, WorkflowRunId};

/// Link to the workflow run that created the comment.
pub fn workflow_run_url(
    github_web_url: &str,
    repository: &RepositoryId,
    run: WorkflowRunId,
) -> String {
    format!(
        "{}/{repository}/actions/runs/{run}",
        github_web_url.trim_end_matches('/')
    )
}

/// Inputs shared by every comment body.
#[derive(Debug, Clone, Copy)]
pub struct CommentContext<'a> {
    pub commit: &'a CommitSha,
    pub build_job_name: &'a str,
    pub workflow_run_url: &'a str,
}

/// Body posted once the build job and its artifact URLs are known.
pub fn success_comment(ctx: CommentContext<'_>, artifacts: &LocatedArtifacts) -> String {
    let CommentContext {
        commit,
        workflow_run_url,
        ..
    } = ctx;
    let job_url = &artifacts.job_url;
    let top_page = &artifacts.urls.top_page;
    let changed_pages = &artifacts.urls.changed_pages;
    format!(
        r#"
Documentation preview for {commit} will be available when [this CircleCI job]({job_url})
completes successfully. You may encounter a `{{"message":"not found"}}` error when reloading
a page. If so, add `/index.html` to the URL.

- [Top page]({top_page})
- [Changed pages]({changed_pages}) (⚠️ only MDX file changes are detected ⚠️)

<details>
<summary>More info</summary>

- Ignore this comment if this PR does not change the documentation.
- It takes a few minutes for the preview to be available.
- The preview is updated when a new commit is pushed to this PR.
- This comment was created by {workflow_run_url}.

</details>
"#
    )
}

/// Body posted when the build job's commit status never appeared.
pub fn status_missing_comment(ctx: CommentContext<'_>, error: &PollError) -> String {
    let CommentContext {
        commit,
        build_job_name,
        workflow_run_url,
    } = ctx;
    format!(
        r#"
Failed to find a documentation preview for {commit}.

<details>
<summary>More info</summary>

- If the `ci/circleci: {build_job_name}` job status is successful, you can see the preview with
  the following steps:
  1. Click `Details`.
  2. Click `Artifacts`.
  3. Click `docs/build/html/index.html`.
- Reason: {error}.
- This comment was created by {workflow_run_url}.

</details>
"#
    )
}

/// Body posted when the build job could not be correlated.
pub fn artifacts_missing_comment(ctx: CommentContext<'_>, error: &LocateError) -> String {
    let CommentContext {
        commit,
        workflow_run_url,
        ..
    } = ctx;
    let mut body = format!(
        "Failed to find a documentation preview for {commit}. \
         See {workflow_run_url} for what went wrong."
    );
    if let Some(job_url) = error.job_url() {
        body.push_str(&format!(
            " The artifacts may still be reachable from [the CircleCI job]({job_url})."
        ));
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArtifactUrls, JobId, ProviderError};

    const RUN_URL: &str = "https://github.com/mlflow/mlflow/actions/runs/99";

    fn ctx(commit: &CommitSha) -> CommentContext<'_> {
        CommentContext {
            commit,
            build_job_name: "build_doc",
            workflow_run_url: RUN_URL,
        }
    }

    #[test]
    fn run_url_joins_web_base_repo_and_id() {
        let repo = RepositoryId::new("mlflow/mlflow").unwrap();
        assert_eq!(
            workflow_run_url("https://github.com/", &repo, WorkflowRunId::new(99)),
            RUN_URL
        );
    }

    #[test]
    fn success_links_job_and_both_pages() {
        let commit = CommitSha::new("abc123").unwrap();
        let build_job = JobId::new("uuid-build").unwrap();
        let artifacts = LocatedArtifacts {
            job_url: "https://circleci.com/gh/mlflow/mlflow/9001".into(),
            urls: ArtifactUrls::for_job(&build_job),
            build_job,
        };

        let body = success_comment(ctx(&commit), &artifacts);

        assert!(body.contains("Documentation preview for abc123"));
        assert!(body.contains("[this CircleCI job](https://circleci.com/gh/mlflow/mlflow/9001)"));
        assert!(body.contains(&format!("[Top page]({})", artifacts.urls.top_page)));
        assert!(body.contains(&format!("[Changed pages]({})", artifacts.urls.changed_pages)));
        assert!(body.contains(r#"`{"message":"not found"}`"#));
        assert!(body.contains(RUN_URL));
    }

    #[test]
    fn status_fallback_names_commit_check_and_run() {
        let commit = CommitSha::new("abc123").unwrap();
        let error = PollError::NotFound {
            check_name: "build_doc".into(),
            attempts: 5,
        };

        let body = status_missing_comment(ctx(&commit), &error);

        assert!(body.contains("Failed to find a documentation preview for abc123."));
        assert!(body.contains("`ci/circleci: build_doc`"));
        assert!(body.contains(RUN_URL));
    }

    #[test]
    fn artifact_fallback_links_job_when_known() {
        let commit = CommitSha::new("abc123").unwrap();
        let error = LocateError::CorrelationFailed {
            attempts: 5,
            last_job_url: Some("https://circleci.com/gh/mlflow/mlflow/9001".into()),
            last_error: ProviderError::Transport {
                operation: "get job".into(),
                message: "timed out".into(),
            },
        };

        let body = artifacts_missing_comment(ctx(&commit), &error);

        assert!(body.starts_with("Failed to find a documentation preview for abc123. See"));
        assert!(body.contains(RUN_URL));
        assert!(body.contains("(https://circleci.com/gh/mlflow/mlflow/9001)"));
    }

    #[test]
    fn undecodable_workflow_still_links_job() {
        let commit = CommitSha::new("abc123").unwrap();
        let error = LocateError::Provider {
            error: ProviderError::MalformedResponse {
                operation: "list workflow jobs".into(),
                message: "missing field `items`".into(),
            },
            job_url: Some("https://circleci.com/gh/mlflow/mlflow/9001".into()),
        };

        let body = artifacts_missing_comment(ctx(&commit), &error);

        assert!(body.contains("(https://circleci.com/gh/mlflow/mlflow/9001)"));
    }
}
