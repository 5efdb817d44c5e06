//! Collaborator traits for deployment environment lookups.
//!
//! The resolver depends on these two capabilities only. [`BitbucketClient`]
//! implements both; tests substitute mocks.
//!
//! [`BitbucketClient`]: super::BitbucketClient

use async_trait::async_trait;

use crate::error::ApiError;

use super::types::{EnvironmentSummary, RawResponse};

/// Lists the deployment environments of a repository.
#[async_trait]
pub trait EnvironmentLister: Send + Sync {
    /// Returns every environment summary, in server order.
    ///
    /// Any failure, including a non-success status, is an error.
    async fn list_environments(
        &self,
        workspace: &str,
        repository: &str,
    ) -> std::result::Result<Vec<EnvironmentSummary>, ApiError>;
}

/// Fetches one deployment environment by canonical id.
#[async_trait]
pub trait EnvironmentFetcher: Send + Sync {
    /// Returns the raw status and body.
    ///
    /// `Err` is reserved for transport failures; every HTTP status,
    /// including 4xx and 5xx, comes back as `Ok`.
    async fn fetch_environment(
        &self,
        workspace: &str,
        repository: &str,
        uuid: &str,
    ) -> std::result::Result<RawResponse, ApiError>;
}
