//! Configuration module.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `bbdeploy.yaml`
//! - Environment variable overrides and credentials
//! - Validation of configuration values

mod parser;
mod spec;
mod validator;

pub use parser::{
    apply_overrides, credentials_from, find_config_file, locate_config_file, user_config_file,
    ConfigParser, DEFAULT_CONFIG_FILES, ENV_API_URL, ENV_OAUTH_TOKEN, ENV_PASSWORD, ENV_TIMEOUT_SECS,
    ENV_USERNAME,
};
pub use spec::{ApiConfig, AppConfig, ResolverConfig};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
