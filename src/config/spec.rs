//! Configuration specification types.
//!
//! These structs map to `bbdeploy.yaml`. Every section is optional; an empty
//! or absent file yields the defaults. Credentials are never read from the
//! file, only from the environment (see [`super::ConfigParser::credentials`]).

use serde::{Deserialize, Serialize};

use crate::bitbucket::{BITBUCKET_API_URL, DEFAULT_TIMEOUT_SECS};

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Bitbucket API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Identifier resolution settings.
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Bitbucket API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// API root URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Identifier resolution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Fail before fetching when the identifier matches no environment,
    /// instead of fetching with an empty id.
    #[serde(default)]
    pub fail_on_unmatched: bool,
}

fn default_base_url() -> String {
    String::from(BITBUCKET_API_URL)
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
