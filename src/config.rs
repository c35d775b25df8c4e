//! Client configuration: backend endpoint, session state directory, guard
//! destinations and request timeout. Values come from built-in defaults, an
//! optional JSON file, then command-line flags or environment variables, each
//! layer overriding the previous one. Blank values never override.
//! Configuration values are not secret; do not store tokens here.

use crate::guard::{GuardPaths, DEFAULT_HOME_PATH, DEFAULT_LOGIN_PATH};
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid API base URL {0:?}: expected an absolute http(s) URL")]
    InvalidUrl(String),
    #[error("invalid {field} {value:?}: must be an absolute path starting with '/'")]
    InvalidRoute { field: &'static str, value: String },
    #[error("request timeout must be greater than zero")]
    InvalidTimeout,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub state_dir: PathBuf,
    pub login_path: String,
    pub home_path: String,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            state_dir: default_state_dir(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            home_path: DEFAULT_HOME_PATH.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

/// Optional values layered over the defaults, from a file or the CLI.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub api_base_url: Option<String>,
    pub state_dir: Option<String>,
    pub login_path: Option<String>,
    pub home_path: Option<String>,
    pub request_timeout_seconds: Option<u64>,
}

impl AppConfig {
    /// Loads defaults, then the optional config file, then `overrides`, and
    /// validates the result.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if the final
    /// configuration is invalid.
    pub fn load(file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = file {
            apply_overrides(&mut config, read_file(path)?);
        }
        apply_overrides(&mut config, overrides);

        config.validate()?;
        Ok(config)
    }

    /// Destinations used by the route guard.
    #[must_use]
    pub fn guard_paths(&self) -> GuardPaths {
        GuardPaths {
            login: self.login_path.clone(),
            home: self.home_path.clone(),
        }
    }

    /// # Errors
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.api_base_url)
            .map_err(|_| ConfigError::InvalidUrl(self.api_base_url.clone()))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(self.api_base_url.clone()));
        }

        for (field, value) in [("login path", &self.login_path), ("home path", &self.home_path)] {
            if !value.starts_with('/') || value.starts_with("//") {
                return Err(ConfigError::InvalidRoute {
                    field,
                    value: value.clone(),
                });
            }
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(())
    }
}

fn read_file(path: &Path) -> Result<ConfigOverrides, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_overrides(config: &mut AppConfig, overrides: ConfigOverrides) {
    if let Some(value) = overrides.api_base_url.as_deref().and_then(normalize_value) {
        config.api_base_url = value;
    }
    if let Some(value) = overrides.state_dir.as_deref().and_then(normalize_value) {
        config.state_dir = PathBuf::from(value);
    }
    if let Some(value) = overrides.login_path.as_deref().and_then(normalize_value) {
        config.login_path = value;
    }
    if let Some(value) = overrides.home_path.as_deref().and_then(normalize_value) {
        config.home_path = value;
    }
    if let Some(seconds) = overrides.request_timeout_seconds {
        config.request_timeout = Duration::from_secs(seconds);
    }
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Platform state directory (`$XDG_STATE_HOME` on Linux, local data
/// elsewhere), else a hidden directory in the user's home.
fn default_state_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")))
        .or_else(|| dirs::home_dir().map(|home| home.join(concat!(".", env!("CARGO_PKG_NAME")))))
        .unwrap_or_else(|| PathBuf::from(concat!(".", env!("CARGO_PKG_NAME"))))
}
