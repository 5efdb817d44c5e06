//! Bitbucket API types and data structures.
//!
//! This module defines the wire shapes of the deployment environment
//! endpoints. Decoding is strict: a payload missing a required field is
//! rejected rather than filled with defaults.

use serde::{Deserialize, Serialize};

/// Lightweight projection of an environment, as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSummary {
    /// Canonical, server-assigned identifier (a braced UUID on Bitbucket).
    pub uuid: String,
    /// Human-readable display name. Not guaranteed unique.
    pub name: String,
}

impl EnvironmentSummary {
    /// Creates a new summary.
    #[must_use]
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
        }
    }

    /// Returns true if the identifier equals either the UUID or the name.
    #[must_use]
    pub fn matches(&self, identifier: &str) -> bool {
        self.uuid == identifier || self.name == identifier
    }
}

/// One page of the paginated environment list.
#[derive(Debug, Deserialize)]
pub(crate) struct EnvironmentPage {
    /// Environments on this page.
    pub values: Vec<EnvironmentSummary>,
    /// Link to the next page, if any.
    #[serde(default)]
    pub next: Option<String>,
}

/// Full environment detail returned by the single-environment endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvironmentPayload {
    /// Canonical identifier.
    pub uuid: String,
    /// Display name.
    pub name: String,
    /// Stage classification of the environment.
    pub environment_type: EnvironmentType,
}

/// Stage classification (Test, Staging, Production, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvironmentType {
    /// Display name of the stage.
    pub name: String,
}

/// Status and body of an HTTP response, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Creates a raw response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_environment_page() {
        let json = r#"{
            "pagelen": 10,
            "page": 1,
            "size": 2,
            "values": [
                {"uuid": "{11}", "name": "Test", "slug": "test", "environment_type": {"name": "Test"}},
                {"uuid": "{22}", "name": "Production", "slug": "production"}
            ]
        }"#;

        let page: EnvironmentPage = serde_json::from_str(json).expect("page should parse");
        assert_eq!(page.values.len(), 2);
        assert_eq!(page.values[1], EnvironmentSummary::new("{22}", "Production"));
        assert!(page.next.is_none());
    }

    #[test]
    fn test_payload_requires_stage() {
        let json = r#"{"uuid": "{11}", "name": "Test"}"#;
        assert!(serde_json::from_str::<EnvironmentPayload>(json).is_err());
    }

    #[test]
    fn test_summary_matches_uuid_or_name() {
        let summary = EnvironmentSummary::new("{11}", "prod");
        assert!(summary.matches("{11}"));
        assert!(summary.matches("prod"));
        assert!(!summary.matches("Prod"));
        assert!(!summary.matches("pro"));
    }

    #[test]
    fn test_raw_response_success_range() {
        assert!(RawResponse::new(200, "{}").is_success());
        assert!(RawResponse::new(204, Vec::new()).is_success());
        assert!(!RawResponse::new(301, Vec::new()).is_success());
        assert!(!RawResponse::new(404, Vec::new()).is_success());
    }
}
