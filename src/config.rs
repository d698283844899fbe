//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3001";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_GUARD_TIMEOUT_SECS: u64 = 10;
pub const TOKEN_FILE_NAME: &str = "session.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
    #[error("no data directory available; set MDD_TOKEN_PATH")]
    NoDataDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
    pub guard_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            guard_secs: DEFAULT_GUARD_TIMEOUT_SECS,
        }
    }
}

impl Timeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    #[must_use]
    pub fn guard(&self) -> Duration {
        Duration::from_secs(self.guard_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin without a trailing slash, e.g. `http://localhost:3001`.
    pub api_url: String,
    /// File backing the persisted token slot.
    pub token_path: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build a config for `api_url` with default timeouts and token path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the URL has no http(s) scheme and
    /// [`ConfigError::NoDataDir`] when no platform data directory exists.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: normalize_api_url(api_url)?,
            token_path: default_token_path()?,
            timeouts: Timeouts::default(),
        })
    }

    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `MDD_API_URL`: backend origin, default `http://localhost:3001`
    /// - `MDD_TOKEN_PATH`: token file, default `<data_dir>/mdd/session.json`
    /// - `MDD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `MDD_CONNECT_TIMEOUT_SECS`: default 10
    /// - `MDD_GUARD_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is malformed or no token path can be derived.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("MDD_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        let api_url = normalize_api_url(&api_url)?;

        let token_path = match std::env::var("MDD_TOKEN_PATH") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_token_path()?,
        };

        let timeouts = Timeouts {
            request_secs: env_parse_u64("MDD_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("MDD_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            guard_secs: env_parse_u64("MDD_GUARD_TIMEOUT_SECS", DEFAULT_GUARD_TIMEOUT_SECS),
        };

        Ok(Self { api_url, token_path, timeouts })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

pub(crate) fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            var: "MDD_API_URL",
            message: format!("expected http:// or https:// origin, got '{raw}'"),
        });
    }
    Ok(trimmed.to_owned())
}

fn default_token_path() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join("mdd").join(TOKEN_FILE_NAME))
        .ok_or(ConfigError::NoDataDir)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
