//! CircleCI v2 response shapes, reduced to the fields the pipeline reads.

use serde::Deserialize;

/// `GET /project/{slug}/job/{number}`
#[derive(Debug, Deserialize)]
pub(crate) struct JobDetails {
    pub web_url: String,
    pub latest_workflow: LatestWorkflow,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LatestWorkflow {
    pub id: String,
}

/// `GET /workflow/{id}/job`
#[derive(Debug, Deserialize)]
pub(crate) struct WorkflowJobsPage {
    pub items: Vec<WorkflowJob>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkflowJob {
    pub id: String,
    pub name: String,
}
