//! `preview-docs` entry point.
//!
//! Composition root: parses [`args::Args`], installs the tracing subscriber,
//! builds the GitHub and CircleCI adapters and runs one
//! [`pipeline::PreviewPipeline`] invocation. The process fails only when the
//! comment cannot be written or startup fails; a fallback comment is a success.

mod args;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use circleci::CircleCiClient;
use clap::Parser;
use github::GithubClient;
use pipeline::{InvocationId, PreviewOutcome, PreviewPipeline};
use tracing::{error, info, info_span, warn, Instrument};

use crate::args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let telemetry = telemetry::init(args.log_format)?;

    let invocation = InvocationId::new_random();
    let span = info_span!("preview_docs", invocation = %invocation, repo = %args.repo);
    let result = run(&args).instrument(span).await;
    if let Err(err) = &result {
        error!(error = %format!("{err:#}"), "preview-docs failed");
    }

    telemetry.shutdown().await;
    result
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let github = Arc::new(
        GithubClient::new(args.github_config()).context("constructing GitHub client")?,
    );
    let circleci = Arc::new(
        CircleCiClient::new(args.circleci_config()).context("constructing CircleCI client")?,
    );
    let pipeline = PreviewPipeline::new(args.preview_config(), github.clone(), circleci, github)?;

    match pipeline.run(&args.request()).await? {
        PreviewOutcome::Published { artifacts, comment } => info!(
            build_job = %artifacts.build_job,
            top_page = %artifacts.urls.top_page,
            comment = ?comment,
            "documentation preview published"
        ),
        PreviewOutcome::Fallback { reason, comment } => warn!(
            reason = ?reason,
            comment = ?comment,
            "documentation preview unavailable, fallback comment written"
        ),
    }
    Ok(())
}
