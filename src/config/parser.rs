//! Configuration parser for loading and merging configuration files.
//!
//! This module handles loading configuration from YAML files and environment
//! variables, with proper precedence and error handling. Precedence, lowest
//! first: built-in defaults, the YAML file, environment variables.

use crate::bitbucket::Credentials;
use crate::error::{BitbucketError, ConfigError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::AppConfig;

/// Overrides `api.base_url`.
pub const ENV_API_URL: &str = "BITBUCKET_API_URL";

/// Overrides `api.timeout_secs`.
pub const ENV_TIMEOUT_SECS: &str = "BBDEPLOY_TIMEOUT_SECS";

/// Bearer token; takes precedence over basic credentials.
pub const ENV_OAUTH_TOKEN: &str = "BITBUCKET_OAUTH_TOKEN";

/// Basic-auth username.
pub const ENV_USERNAME: &str = "BITBUCKET_USERNAME";

/// Basic-auth app password.
pub const ENV_PASSWORD: &str = "BITBUCKET_PASSWORD";

/// Configuration parser for loading application configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving the `.env` file.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(BitbucketError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            BitbucketError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<AppConfig> {
        debug!("Parsing YAML configuration");

        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }

        serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            BitbucketError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })
    }

    /// Loads configuration with environment variable overrides.
    ///
    /// With no path, starts from the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or an override
    /// is malformed.
    pub fn load_with_env(&self, path: Option<&Path>) -> Result<AppConfig> {
        let mut config = match path {
            Some(path) => self.load_file(path)?,
            None => {
                debug!("No configuration file, using defaults");
                AppConfig::default()
            }
        };

        apply_overrides(&mut config, |key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                BitbucketError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }

    /// Gets the API credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a username is set without a password.
    pub fn credentials() -> Result<Credentials> {
        credentials_from(|key| std::env::var(key).ok())
    }
}

/// Applies overrides read through `lookup` to the configuration.
///
/// Empty values count as unset.
///
/// # Errors
///
/// Returns an error if the timeout override is not a number.
pub fn apply_overrides(
    config: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

    if let Some(url) = lookup(ENV_API_URL) {
        debug!("Overriding api.base_url from environment");
        config.api.base_url = url;
    }

    if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
        debug!("Overriding api.timeout_secs from environment");
        config.api.timeout_secs = timeout.parse().map_err(|e| {
            BitbucketError::Config(ConfigError::ParseError {
                message: format!("Invalid timeout '{timeout}': {e}"),
                location: Some(String::from(ENV_TIMEOUT_SECS)),
            })
        })?;
    }

    Ok(())
}

/// Builds credentials from values read through `lookup`.
///
/// A token wins over a username and password; nothing set means anonymous.
///
/// # Errors
///
/// Returns an error if a username is set without a password.
pub fn credentials_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
    let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

    if let Some(token) = lookup(ENV_OAUTH_TOKEN) {
        return Ok(Credentials::Bearer { token });
    }

    match (lookup(ENV_USERNAME), lookup(ENV_PASSWORD)) {
        (Some(username), Some(password)) => Ok(Credentials::Basic { username, password }),
        (Some(_), None) => Err(BitbucketError::Config(ConfigError::MissingEnvVar {
            name: String::from(ENV_PASSWORD),
        })),
        (None, _) => Ok(Credentials::Anonymous),
    }
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["bbdeploy.yaml", "bbdeploy.yml", ".bbdeploy.yaml"];

/// Finds the configuration file in the given directory or its parents.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(BitbucketError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }))
}

/// Returns the per-user configuration file path, `<config dir>/bbdeploy/config.yaml`.
#[must_use]
pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bbdeploy").join("config.yaml"))
}

/// Locates a configuration file: the directory tree first, then the user file.
#[must_use]
pub fn locate_config_file(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    find_config_file(start_dir)
        .ok()
        .or_else(|| user_config_file().filter(|path| path.exists()))
}
