//! CircleCI infrastructure adapter for the preview pipeline.
//!
//! Implements [`pipeline::JobProvider`] over the CircleCI v2 API.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Authentication, pagination and response decoding live
//! here. The [`pipeline`] crate sees only [`pipeline::JobProvider`]; the
//! retry loop around these calls is the pipeline's, not this crate's.
//!
//! CircleCI is known to answer valid tokens with an occasional `403`. Those
//! are reported as ordinary [`pipeline::ProviderError::Status`] values and the
//! pipeline retries them.

mod client;
mod wire;

pub use client::{CircleCiClient, CircleCiClientConfig, CircleCiClientError, DEFAULT_API_URL};
