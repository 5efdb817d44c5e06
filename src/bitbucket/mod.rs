//! Bitbucket API integration module.
//!
//! This module provides the collaborator traits used by the resolver and the
//! `reqwest`-backed client that implements them against Bitbucket Cloud.

mod client;
mod environments;
mod types;

pub use client::{BitbucketClient, Credentials, BITBUCKET_API_URL, DEFAULT_TIMEOUT_SECS};
pub use environments::{EnvironmentFetcher, EnvironmentLister};
pub use types::{EnvironmentPayload, EnvironmentSummary, EnvironmentType, RawResponse};
