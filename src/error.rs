//! Error types for the Bitbucket deployment lookup.
//!
//! This module provides the error hierarchy for every stage of a lookup:
//! configuration loading, the Bitbucket HTTP collaborators, and the
//! resolution pipeline itself.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error used to carry an underlying cause across trait boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for the crate.
#[derive(Debug, Error)]
pub enum BitbucketError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Bitbucket API errors raised outside of a resolution.
    #[error("Bitbucket API error: {0}")]
    Api(#[from] ApiError),

    /// Deployment resolution errors.
    #[error("Deployment lookup failed: {0}")]
    Resolve(#[from] ResolveError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// Environment variable is missing.
    #[error("Missing environment variable: {name}")]
    MissingEnvVar {
        /// Name of the missing variable.
        name: String,
    },
}

/// Errors raised by the Bitbucket collaborators.
///
/// For the environment fetcher only [`ApiError::Network`] is ever returned:
/// status handling belongs to the resolver.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP client could not be built.
    #[error("Failed to create HTTP client: {message}")]
    ClientBuild {
        /// Description of the failure.
        message: String,
    },

    /// An endpoint URL could not be built from the base URL.
    #[error("Invalid API URL '{url}': {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Description of the problem.
        message: String,
    },

    /// Connection or body-read failure.
    #[error("Network error communicating with Bitbucket: {message}")]
    Network {
        /// Description of the network error.
        message: String,
        /// Underlying cause.
        #[source]
        source: BoxError,
    },

    /// The API answered with a non-success status.
    #[error("Bitbucket API request failed: {status} - {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The API answered with a body that does not have the expected shape.
    #[error("Invalid response from Bitbucket API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Failures of a single deployment resolution.
///
/// Every variant is terminal: nothing is retried and no partial record is
/// ever returned alongside one of these.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A required input was empty.
    #[error("Required input '{field}' must not be empty")]
    InvalidInput {
        /// Name of the empty field.
        field: &'static str,
    },

    /// Listing the repository environments failed.
    #[error("Failed to list environments for {workspace}/{repository}: {source}")]
    Upstream {
        /// Workspace that was queried.
        workspace: String,
        /// Repository that was queried.
        repository: String,
        /// Underlying collaborator error.
        #[source]
        source: ApiError,
    },

    /// No environment matched the identifier and fail-fast matching is on.
    #[error("No deployment environment with UUID or name '{identifier}'")]
    Unmatched {
        /// The identifier that matched nothing.
        identifier: String,
    },

    /// The environment does not exist.
    #[error("Deployment environment not found: '{uuid}'")]
    NotFound {
        /// Canonical id that was fetched (may be empty).
        uuid: String,
    },

    /// The API answered with a 5xx status.
    #[error("Internal server error fetching deployment environment (status {status})")]
    UpstreamServer {
        /// HTTP status code.
        status: u16,
    },

    /// The API answered with a non-success status that is neither 404 nor 5xx.
    #[error("Unexpected status {status} fetching deployment environment: {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, lossily decoded.
        body: String,
    },

    /// The fetch call failed at the transport level.
    #[error("Transport error fetching deployment environment: {source}")]
    Transport {
        /// Underlying collaborator error.
        #[source]
        source: ApiError,
    },

    /// The fetch body could not be decoded into an environment.
    #[error("Malformed deployment environment payload ({len} bytes): {source}", len = .body.len())]
    Decode {
        /// The raw response body.
        body: Vec<u8>,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, BitbucketError>;

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl ApiError {
    /// Creates a network error wrapping its cause.
    #[must_use]
    pub fn network(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Network {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Creates a status error.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }
}

impl ResolveError {
    /// Returns the raw response body for decode failures.
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Self::Decode { body, .. } => Some(body),
            _ => None,
        }
    }
}
