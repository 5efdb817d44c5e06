//! Configuration validation.
//!
//! Checks the loaded configuration before any client is built, so a bad
//! base URL or timeout is reported as a configuration error rather than as a
//! failed lookup.

use crate::error::{BitbucketError, ConfigError, Result};
use reqwest::Url;
use tracing::debug;

use super::spec::{ApiConfig, AppConfig};

/// Largest accepted request timeout, in seconds.
const MAX_TIMEOUT_SECS: u64 = 300;

/// Timeouts above this many seconds draw a warning.
const LONG_TIMEOUT_SECS: u64 = 120;

/// Validator for application configuration.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates an application configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate(&self, config: &AppConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_api(&config.api, &mut result);

        if result.errors.is_empty() {
            debug!("Configuration validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(BitbucketError::Config(ConfigError::validation(
                first_error.message.clone(),
                first_error.field.clone(),
            )))
        }
    }

    /// Validates API configuration.
    fn validate_api(api: &ApiConfig, result: &mut ValidationResult) {
        match Url::parse(&api.base_url) {
            Ok(url) if !matches!(url.scheme(), "http" | "https") => {
                result.errors.push(ValidationError {
                    field: String::from("api.base_url"),
                    message: format!("Unsupported URL scheme '{}'", url.scheme()),
                });
            }
            Ok(url) if url.host_str().is_none() => {
                result.errors.push(ValidationError {
                    field: String::from("api.base_url"),
                    message: format!("URL '{}' has no host", api.base_url),
                });
            }
            Ok(url) => {
                if url.scheme() == "http" {
                    result.warnings.push(format!(
                        "api.base_url '{}' is not HTTPS; credentials are sent in clear text",
                        api.base_url
                    ));
                }
            }
            Err(e) => {
                result.errors.push(ValidationError {
                    field: String::from("api.base_url"),
                    message: format!("Invalid URL '{}': {e}", api.base_url),
                });
            }
        }

        if api.timeout_secs == 0 || api.timeout_secs > MAX_TIMEOUT_SECS {
            result.errors.push(ValidationError {
                field: String::from("api.timeout_secs"),
                message: format!(
                    "Timeout must be between 1 and {MAX_TIMEOUT_SECS} seconds, got {}",
                    api.timeout_secs
                ),
            });
        } else if api.timeout_secs > LONG_TIMEOUT_SECS {
            result.warnings.push(format!(
                "api.timeout_secs of {}s is unusually long",
                api.timeout_secs
            ));
        }
    }
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
