//! GitHub infrastructure adapter for the preview pipeline.
//!
//! Implements [`pipeline::CommitStatusProvider`] and
//! [`pipeline::CommentProvider`] over the GitHub REST API using `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. Request
//! formatting, authentication headers, pagination and response decoding live
//! here; the [`pipeline`] crate never sees them.
//!
//! ## Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list statuses | `GET /repos/{repo}/commits/{sha}/status` |
//! | list comments | `GET /repos/{repo}/issues/{pr}/comments` (paginated) |
//! | create comment | `POST /repos/{repo}/issues/{pr}/comments` |
//! | update comment | `PATCH {comment.url}` |

mod client;
mod wire;

pub use client::{GithubClient, GithubClientConfig, GithubClientError, DEFAULT_API_URL};
