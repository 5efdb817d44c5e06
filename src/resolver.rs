//! Deployment environment resolver.
//!
//! Turns a user-supplied identifier, which may be either a canonical UUID or
//! a display name, into a fully populated [`DeploymentRecord`]. The pipeline
//! is strictly linear: validate, list, match, fetch, decode, project. Every
//! stage fails fast and nothing is retried.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bitbucket::{
    EnvironmentFetcher, EnvironmentLister, EnvironmentPayload, EnvironmentSummary, RawResponse,
};
use crate::error::ResolveError;
use crate::schema::{FIELD_REPOSITORY, FIELD_UUID, FIELD_WORKSPACE};

/// What the caller asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionInput {
    /// Workspace owning the repository.
    pub workspace: String,
    /// Repository slug.
    pub repository: String,
    /// Canonical UUID or display name of the environment.
    pub identifier: String,
}

impl ResolutionInput {
    /// Creates a new input.
    #[must_use]
    pub fn new(
        workspace: impl Into<String>,
        repository: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            workspace: workspace.into(),
            repository: repository.into(),
            identifier: identifier.into(),
        }
    }

    /// Checks that every required input is non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidInput`] naming the first blank field.
    pub fn validate(&self) -> Result<(), ResolveError> {
        for (field, value) in [
            (FIELD_WORKSPACE, &self.workspace),
            (FIELD_REPOSITORY, &self.repository),
            (FIELD_UUID, &self.identifier),
        ] {
            if value.trim().is_empty() {
                return Err(ResolveError::InvalidInput { field });
            }
        }
        Ok(())
    }
}

/// A resolved deployment environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentRecord {
    /// Canonical id, never the display name that may have been supplied.
    pub uuid: String,
    /// Display name.
    pub name: String,
    /// Stage display name.
    pub stage: String,
    /// Caller-supplied workspace.
    pub workspace: String,
    /// Caller-supplied repository.
    pub repository: String,
}

/// Resolves deployment environments through injected collaborators.
pub struct DeploymentResolver<'a, L: ?Sized, F: ?Sized> {
    /// Environment lister.
    lister: &'a L,
    /// Environment fetcher.
    fetcher: &'a F,
    /// Fail before fetching when nothing matches the identifier.
    fail_on_unmatched: bool,
}

impl<'a, L, F> DeploymentResolver<'a, L, F>
where
    L: EnvironmentLister + ?Sized,
    F: EnvironmentFetcher + ?Sized,
{
    /// Creates a new resolver.
    ///
    /// Unmatched identifiers are passed to the fetcher as an empty id by
    /// default; see [`Self::with_fail_on_unmatched`].
    #[must_use]
    pub const fn new(lister: &'a L, fetcher: &'a F) -> Self {
        Self {
            lister,
            fetcher,
            fail_on_unmatched: false,
        }
    }

    /// Reports [`ResolveError::Unmatched`] instead of fetching with an empty id.
    #[must_use]
    pub const fn with_fail_on_unmatched(mut self, fail_on_unmatched: bool) -> Self {
        self.fail_on_unmatched = fail_on_unmatched;
        self
    }

    /// Resolves an identifier to a deployment record.
    ///
    /// # Errors
    ///
    /// Returns the first failure of the pipeline; see [`ResolveError`].
    pub async fn resolve(&self, input: &ResolutionInput) -> Result<DeploymentRecord, ResolveError> {
        input.validate()?;
        info!(
            "Resolving deployment environment '{}' in {}/{}",
            input.identifier, input.workspace, input.repository
        );

        let environments = self
            .lister
            .list_environments(&input.workspace, &input.repository)
            .await
            .map_err(|source| ResolveError::Upstream {
                workspace: input.workspace.clone(),
                repository: input.repository.clone(),
                source,
            })?;

        let uuid = match match_environment(&environments, &input.identifier) {
            Some(environment) => {
                debug!(
                    "Identifier '{}' matched environment {} ({})",
                    input.identifier, environment.uuid, environment.name
                );
                environment.uuid.clone()
            }
            None if self.fail_on_unmatched => {
                return Err(ResolveError::Unmatched {
                    identifier: input.identifier.clone(),
                });
            }
            None => {
                warn!(
                    "Identifier '{}' matched none of {} environments, fetching with an empty id",
                    input.identifier,
                    environments.len()
                );
                String::new()
            }
        };

        let response = self
            .fetcher
            .fetch_environment(&input.workspace, &input.repository, &uuid)
            .await
            .map_err(|source| ResolveError::Transport { source })?;

        let payload = decode_environment(&uuid, response)?;

        Ok(DeploymentRecord {
            uuid: payload.uuid,
            name: payload.name,
            stage: payload.environment_type.name,
            workspace: input.workspace.clone(),
            repository: input.repository.clone(),
        })
    }
}

/// Returns the first environment whose UUID or name equals the identifier.
///
/// Comparison is exact and case-sensitive; list order decides ties.
#[must_use]
pub fn match_environment<'e>(
    environments: &'e [EnvironmentSummary],
    identifier: &str,
) -> Option<&'e EnvironmentSummary> {
    environments.iter().find(|environment| environment.matches(identifier))
}

/// Classifies the fetch status and decodes a successful body.
fn decode_environment(uuid: &str, response: RawResponse) -> Result<EnvironmentPayload, ResolveError> {
    match response.status {
        404 => {
            return Err(ResolveError::NotFound {
                uuid: uuid.to_string(),
            });
        }
        status if status >= 500 => return Err(ResolveError::UpstreamServer { status }),
        status if !response.is_success() => {
            return Err(ResolveError::UnexpectedStatus {
                status,
                body: response.body_text(),
            });
        }
        _ => {}
    }

    debug!("Deployment response raw: {}", response.body_text());

    let decoded = serde_json::from_slice::<EnvironmentPayload>(&response.body);
    let payload = match decoded {
        Ok(payload) => payload,
        Err(source) => {
            return Err(ResolveError::Decode {
                body: response.body,
                source,
            });
        }
    };

    debug!("Deployment response: {payload:?}");

    // A collection body or a blank record can decode without naming an environment.
    if payload.uuid.is_empty() {
        return Err(ResolveError::NotFound {
            uuid: uuid.to_string(),
        });
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        Lister {}

        #[async_trait]
        impl EnvironmentLister for Lister {
            async fn list_environments(
                &self,
                workspace: &str,
                repository: &str,
            ) -> std::result::Result<Vec<EnvironmentSummary>, ApiError>;
        }
    }

    mock! {
        Fetcher {}

        #[async_trait]
        impl EnvironmentFetcher for Fetcher {
            async fn fetch_environment(
                &self,
                workspace: &str,
                repository: &str,
                uuid: &str,
            ) -> std::result::Result<RawResponse, ApiError>;
        }
    }

    const PROD_BODY: &str =
        r#"{"uuid": "env-1", "name": "prod", "slug": "prod", "environment_type": {"name": "Production", "rank": 2}}"#;

    fn lister_with(environments: Vec<EnvironmentSummary>) -> MockLister {
        let mut lister = MockLister::new();
        lister
            .expect_list_environments()
            .with(eq("acme"), eq("api"))
            .times(1)
            .returning(move |_, _| Ok(environments.clone()));
        lister
    }

    fn fetcher_expecting(uuid: &'static str, status: u16, body: &'static str) -> MockFetcher {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch_environment()
            .with(eq("acme"), eq("api"), eq(uuid))
            .times(1)
            .returning(move |_, _, _| Ok(RawResponse::new(status, body)));
        fetcher
    }

    fn fetcher_unused() -> MockFetcher {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch_environment().never();
        fetcher
    }

    fn prod_list() -> Vec<EnvironmentSummary> {
        vec![EnvironmentSummary::new("env-1", "prod")]
    }

    fn expected_prod_record() -> DeploymentRecord {
        DeploymentRecord {
            uuid: String::from("env-1"),
            name: String::from("prod"),
            stage: String::from("Production"),
            workspace: String::from("acme"),
            repository: String::from("api"),
        }
    }

    #[tokio::test]
    async fn test_resolve_by_name() {
        let lister = lister_with(prod_list());
        let fetcher = fetcher_expecting("env-1", 200, PROD_BODY);
        let resolver = DeploymentResolver::new(&lister, &fetcher);

        let record = resolver
            .resolve(&ResolutionInput::new("acme", "api", "prod"))
            .await
            .expect("resolution should succeed");

        assert_eq!(record, expected_prod_record());
    }

    #[tokio::test]
    async fn test_resolve_by_uuid_matches_name_lookup() {
        let lister = lister_with(prod_list());
        let fetcher = fetcher_expecting("env-1", 200, PROD_BODY);
        let resolver = DeploymentResolver::new(&lister, &fetcher);

        let record = resolver
            .resolve(&ResolutionInput::new("acme", "api", "env-1"))
            .await
            .expect("resolution should succeed");

        assert_eq!(record, expected_prod_record());
    }

    #[tokio::test]
    async fn test_name_match_fetches_with_canonical_id() {
        let lister = lister_with(vec![
            EnvironmentSummary::new("{aaa}", "Test"),
            EnvironmentSummary::new("{bbb}", "Staging"),
        ]);
        let fetcher = fetcher_expecting(
            "{bbb}",
            200,
            r#"{"uuid": "{bbb}", "name": "Staging", "environment_type": {"name": "Staging"}}"#,
        );
        let resolver = DeploymentResolver::new(&lister, &fetcher);

        let record = resolver
            .resolve(&ResolutionInput::new("acme", "api", "Staging"))
            .await
            .expect("resolution should succeed");

        assert_eq!(record.uuid, "{bbb}");
    }

    #[tokio::test]
    async fn test_earliest_entry_wins() {
        // "shared" is the name of the first entry and the uuid of the second.
        let lister = lister_with(vec![
            EnvironmentSummary::new("{first}", "shared"),
            EnvironmentSummary::new("shared", "other"),
        ]);
        let fetcher = fetcher_expecting(
            "{first}",
            200,
            r#"{"uuid": "{first}", "name": "shared", "environment_type": {"name": "Test"}}"#,
        );
        let resolver = DeploymentResolver::new(&lister, &fetcher);

        let record = resolver
            .resolve(&ResolutionInput::new("acme", "api", "shared"))
            .await
            .expect("resolution should succeed");

        assert_eq!(record.uuid, "{first}");
    }

    #[tokio::test]
    async fn test_server_workspace_and_repository_are_ignored() {
        let lister = lister_with(prod_list());
        let fetcher = fetcher_expecting(
            "env-1",
            200,
            r#"{"uuid": "env-1", "name": "prod", "environment_type": {"name": "Production"},
                "workspace": "evil", "repository": "other"}"#,
        );
        let resolver = DeploymentResolver::new(&lister, &fetcher);

        let record = resolver
            .resolve(&ResolutionInput::new("acme", "api", "prod"))
            .await
            .expect("resolution should succeed");

        assert_eq!(record.workspace, "acme");
        assert_eq!(record.repository, "api");
    }

    #[tokio::test]
    async fn test_unmatched_defers_to_fetch_not_found() {
        let lister = lister_with(prod_list());
        let fetcher = fetcher_expecting("", 404, "");
        let resolver = DeploymentResolver::new(&lister, &fetcher);

        let err = resolver
            .resolve(&ResolutionInput::new("acme", "api", "PROD"))
            .await
            .expect_err("unmatched identifier must not produce a record");

        assert!(matches!(err, ResolveError::NotFound { ref uuid } if uuid.is_empty()));
    }

    #[tokio::test]
    async fn test_unmatched_collection_body_is_not_a_record() {
        // Without an id the endpoint can answer with the environment list itself.
        let lister = lister_with(prod_list());
        let fetcher = fetcher_expecting(
            "",
            200,
            r#"{"values": [{"uuid": "env-1", "name": "prod"}], "page": 1}"#,
        );
        let resolver = DeploymentResolver::new(&lister, &fetcher);

        let err = resolver
            .resolve(&ResolutionInput::new("acme", "api", "missing"))
            .await
            .expect_err("a list body must not decode into a record");

        assert!(matches!(err, ResolveError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unmatched_fail_fast() {
        let lister = lister_with(prod_list());
        let fetcher = fetcher_unused();
        let resolver = DeploymentResolver::new(&lister, &fetcher).with_fail_on_unmatched(true);

        let err = resolver
            .resolve(&ResolutionInput::new("acme", "api", "missing"))
            .await
            .expect_err("fail-fast must reject unmatched identifiers");

        assert!(matches!(err, ResolveError::Unmatched { ref identifier } if identifier == "missing"));
    }

    #[tokio::test]
    async fn test_lister_failure_is_upstream() {
        let mut lister = MockLister::new();
        lister
            .expect_list_environments()
            .times(1)
            .returning(|_, _| Err(ApiError::status(403, "Forbidden")));
        let fetcher = fetcher_unused();
        let resolver = DeploymentResolver::new(&lister, &fetcher);

        let err = resolver
            .resolve(&ResolutionInput::new("acme", "api", "prod"))
            .await
            .expect_err("listing failure is terminal");

        assert!(matches!(
            err,
            ResolveError::Upstream {
                source: ApiError::Status { status: 403, .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_not_found_status() {
        let lister = lister_with(prod_list());
        let fetcher = fetcher_expecting("env-1", 404, r#"{"type": "error"}"#);
        let resolver = DeploymentResolver::new(&lister, &fetcher);

        let err = resolver
            .resolve(&ResolutionInput::new("acme", "api", "prod"))
            .await
            .expect_err("404 must fail");

        assert!(matches!(err, ResolveError::NotFound { ref uuid } if uuid == "env-1"));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let lister = lister_with(prod_list());
        let fetcher = fetcher_expecting("env-1", 502, "Bad Gateway");
        let resolver = DeploymentResolver::new(&lister, &fetcher);

        let err = resolver
            .resolve(&ResolutionInput::new("acme", "api", "prod"))
            .await
            .expect_err("5xx must fail");

        assert!(matches!(err, ResolveError::UpstreamServer { status: 502 }));
    }

    #[tokio::test]
    async fn test_unexpected_client_status() {
        let lister = lister_with(prod_list());
        let fetcher = fetcher_expecting("env-1", 401, "Unauthorized");
        let resolver = DeploymentResolver::new(&lister, &fetcher);

        let err = resolver
            .resolve(&ResolutionInput::new("acme", "api", "prod"))
            .await
            .expect_err("401 must fail");

        assert!(matches!(
            err,
            ResolveError::UnexpectedStatus { status: 401, ref body } if body == "Unauthorized"
        ));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let lister = lister_with(prod_list());
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch_environment()
            .times(1)
            .returning(|_, _, _| {
                Err(ApiError::network(
                    "Request failed",
                    std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
                ))
            });
        let resolver = DeploymentResolver::new(&lister, &fetcher);

        let err = resolver
            .resolve(&ResolutionInput::new("acme", "api", "prod"))
            .await
            .expect_err("transport failure must fail");

        assert!(matches!(
            err,
            ResolveError::Transport {
                source: ApiError::Network { .. }
            }
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_keeps_bytes() {
        let lister = lister_with(prod_list());
        let fetcher = fetcher_expecting("env-1", 200, "{\"uuid\": \"env-1\", \"name\":");
        let resolver = DeploymentResolver::new(&lister, &fetcher);

        let err = resolver
            .resolve(&ResolutionInput::new("acme", "api", "prod"))
            .await
            .expect_err("truncated body must fail");

        assert!(matches!(err, ResolveError::Decode { .. }));
        assert_eq!(err.body(), Some(&b"{\"uuid\": \"env-1\", \"name\":"[..]));
    }

    #[tokio::test]
    async fn test_missing_stage_is_decode_error() {
        let lister = lister_with(prod_list());
        let fetcher = fetcher_expecting("env-1", 200, r#"{"uuid": "env-1", "name": "prod"}"#);
        let resolver = DeploymentResolver::new(&lister, &fetcher);

        let err = resolver
            .resolve(&ResolutionInput::new("acme", "api", "prod"))
            .await
            .expect_err("missing stage must fail");

        assert!(matches!(err, ResolveError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_blank_uuid_payload_is_not_found() {
        let lister = lister_with(prod_list());
        let fetcher = fetcher_expecting(
            "env-1",
            200,
            r#"{"uuid": "", "name": "", "environment_type": {"name": ""}}"#,
        );
        let resolver = DeploymentResolver::new(&lister, &fetcher);

        let err = resolver
            .resolve(&ResolutionInput::new("acme", "api", "prod"))
            .await
            .expect_err("blank payload must fail");

        assert!(matches!(err, ResolveError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_blank_input_makes_no_calls() {
        let mut lister = MockLister::new();
        lister.expect_list_environments().never();
        let fetcher = fetcher_unused();
        let resolver = DeploymentResolver::new(&lister, &fetcher);

        let err = resolver
            .resolve(&ResolutionInput::new("acme", " ", "prod"))
            .await
            .expect_err("blank repository must fail");

        assert!(matches!(err, ResolveError::InvalidInput { field: "repository" }));
    }

    #[tokio::test]
    async fn test_resolve_against_http_api() {
        use crate::bitbucket::{BitbucketClient, Credentials};
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2.0/repositories/acme/api/environments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "values": [
                    {"uuid": "env-0", "name": "test"},
                    {"uuid": "env-1", "name": "prod"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/2.0/repositories/acme/api/environments/env-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PROD_BODY))
            .expect(1)
            .mount(&server)
            .await;

        let client = BitbucketClient::with_options(&server.uri(), 5, Credentials::Anonymous)
            .expect("client should build");
        let resolver = DeploymentResolver::new(&client, &client);

        let record = resolver
            .resolve(&ResolutionInput::new("acme", "api", "prod"))
            .await
            .expect("resolution should succeed");

        assert_eq!(record, expected_prod_record());
    }

    #[tokio::test]
    async fn test_truncated_fetch_body_is_transport_error() {
        use crate::bitbucket::{BitbucketClient, Credentials};
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let addr = listener.local_addr().expect("listener has an address");
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("client should connect");
            let mut request = Vec::new();
            let mut buf = [0_u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.expect("request should be readable");
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"uuid\"")
                .await
                .expect("response should be writable");
            let _ = socket.shutdown().await;
        });

        let lister = lister_with(prod_list());
        let base_url = format!("http://{addr}/");
        let client = BitbucketClient::with_options(&base_url, 5, Credentials::Anonymous)
            .expect("client should build");
        let resolver = DeploymentResolver::new(&lister, &client);

        let err = resolver
            .resolve(&ResolutionInput::new("acme", "api", "prod"))
            .await
            .expect_err("short body must fail");

        assert!(matches!(
            err,
            ResolveError::Transport {
                source: ApiError::Network { .. }
            }
        ));
        assert!(err.body().is_none());
    }

    #[test]
    fn test_match_is_exact() {
        let environments = vec![
            EnvironmentSummary::new("{aaa}", "Production"),
            EnvironmentSummary::new("{bbb}", "production-eu"),
        ];

        assert!(match_environment(&environments, "production").is_none());
        assert!(match_environment(&environments, "Prod").is_none());
        assert_eq!(
            match_environment(&environments, "production-eu").map(|e| e.uuid.as_str()),
            Some("{bbb}")
        );
        assert!(match_environment(&[], "anything").is_none());
    }

    #[test]
    fn test_validate_reports_first_blank_field() {
        assert!(ResolutionInput::new("acme", "api", "prod").validate().is_ok());
        assert!(matches!(
            ResolutionInput::new("", "", "").validate(),
            Err(ResolveError::InvalidInput { field: "workspace" })
        ));
        assert!(matches!(
            ResolutionInput::new("acme", "api", "").validate(),
            Err(ResolveError::InvalidInput { field: "uuid" })
        ));
    }
}
