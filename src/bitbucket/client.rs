//! Bitbucket API client implementation.
//!
//! This module provides the HTTP client for the Bitbucket Cloud REST API
//! (version 2.0) deployment environment endpoints.

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Url};
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::{ApiError, Result};

use super::environments::{EnvironmentFetcher, EnvironmentLister};
use super::types::{EnvironmentPage, EnvironmentSummary, RawResponse};

/// Bitbucket Cloud API base URL.
pub const BITBUCKET_API_URL: &str = "https://api.bitbucket.org/";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("bbdeploy/", env!("CARGO_PKG_VERSION"));

/// Authentication applied to every request.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    /// No authentication (public repositories only).
    #[default]
    Anonymous,
    /// HTTP basic authentication with a username and app password.
    Basic {
        /// Bitbucket username.
        username: String,
        /// App password.
        password: String,
    },
    /// Bearer token (OAuth access token or workspace access token).
    Bearer {
        /// The token.
        token: String,
    },
}

impl Credentials {
    /// Short name of the authentication scheme, for logs.
    #[must_use]
    pub const fn scheme(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Basic { .. } => "basic",
            Self::Bearer { .. } => "bearer",
        }
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Anonymous => request,
            Self::Basic { username, password } => request.basic_auth(username, Some(password)),
            Self::Bearer { token } => request.bearer_auth(token),
        }
    }
}

// Secrets never reach logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::Bearer { .. } => f.debug_struct("Bearer").field("token", &"***").finish(),
        }
    }
}

/// Bitbucket API client.
#[derive(Debug, Clone)]
pub struct BitbucketClient {
    /// HTTP client.
    client: Client,
    /// API root; endpoint paths are appended to it.
    base_url: Url,
    /// Request authentication.
    credentials: Credentials,
}

impl BitbucketClient {
    /// Creates a client for the public Bitbucket Cloud API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_options(BITBUCKET_API_URL, DEFAULT_TIMEOUT_SECS, credentials)
    }

    /// Creates a client with a custom base URL and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be created.
    pub fn with_options(base_url: &str, timeout_secs: u64, credentials: Credentials) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;

        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                url: base_url.to_string(),
                message: String::from("URL cannot be used as a base"),
            }
            .into());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::ClientBuild {
                message: e.to_string(),
            })?;

        debug!(
            "Bitbucket client for {base_url} ({} auth, {timeout_secs}s timeout)",
            credentials.scheme()
        );

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Builds an endpoint URL by appending percent-encoded path segments.
    ///
    /// An empty segment yields a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl {
                url: self.base_url.to_string(),
                message: String::from("URL cannot be used as a base"),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Starts an authenticated GET request.
    fn get(&self, url: Url) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json");
        self.credentials.apply(request)
    }
}

#[async_trait]
impl EnvironmentLister for BitbucketClient {
    async fn list_environments(
        &self,
        workspace: &str,
        repository: &str,
    ) -> std::result::Result<Vec<EnvironmentSummary>, ApiError> {
        let url = self.endpoint(&["2.0", "repositories", workspace, repository, "environments"])?;
        trace!("GET {url}");

        let response = self
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::network("Request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::status(status.as_u16(), body));
        }

        let page: EnvironmentPage = response.json().await.map_err(|e| ApiError::InvalidResponse {
            message: format!("Failed to parse environment list: {e}"),
        })?;

        if let Some(next) = &page.next {
            debug!("Ignoring further environment pages starting at {next}");
        }
        debug!(
            "Found {} environments for {workspace}/{repository}",
            page.values.len()
        );

        Ok(page.values)
    }
}

#[async_trait]
impl EnvironmentFetcher for BitbucketClient {
    async fn fetch_environment(
        &self,
        workspace: &str,
        repository: &str,
        uuid: &str,
    ) -> std::result::Result<RawResponse, ApiError> {
        let url = self.endpoint(&[
            "2.0",
            "repositories",
            workspace,
            repository,
            "environments",
            uuid,
        ])?;
        trace!("GET {url}");

        let response = self
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::network("Request failed", e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::network("Failed to read response body", e))?;

        Ok(RawResponse::new(status, body.to_vec()))
    }
}
