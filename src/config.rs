//! Host configuration loaded from environment variables.
//!
//! `.env` is read by `main` before this runs, so values from the file and the
//! real environment are looked up the same way. Command-line flags override
//! the base URL afterwards.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;
use std::time::Duration;

use floorplan::config::EditorConfig;
use floorplan::reconciler::StalePolicy;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors produced while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    /// The API base URL is not an http(s) URL.
    #[error("API URL must start with http:// or https://: {0}")]
    InvalidApiUrl(String),
}

/// Everything the host needs to talk to the table store and drive the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the table API, without a trailing slash.
    pub api_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub editor: EditorConfig,
}

impl AppConfig {
    /// Load from the process environment.
    ///
    /// - `SEATING_API_URL`: table API base URL
    /// - `SEATING_REQUEST_TIMEOUT_SECS` / `SEATING_CONNECT_TIMEOUT_SECS`
    /// - `SEATING_RESIZE_DEBOUNCE_MS`, `SEATING_SAVED_FLASH_MS`
    /// - `SEATING_DISCARD_STALE`: `true` to drop out-of-order save responses
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to read variables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable is set to an unparsable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = EditorConfig::default();
        let api_url = lookup("SEATING_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned());

        let discard_stale = match lookup("SEATING_DISCARD_STALE") {
            None => false,
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidValue { key: "SEATING_DISCARD_STALE", value: raw })?,
        };

        Ok(Self {
            api_url: normalize_api_url(&api_url)?,
            request_timeout: Duration::from_secs(env_parse(
                &lookup,
                "SEATING_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            connect_timeout: Duration::from_secs(env_parse(
                &lookup,
                "SEATING_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?),
            editor: EditorConfig {
                resize_debounce_ms: env_parse(&lookup, "SEATING_RESIZE_DEBOUNCE_MS", defaults.resize_debounce_ms)?,
                saved_flash_ms: env_parse(&lookup, "SEATING_SAVED_FLASH_MS", defaults.saved_flash_ms)?,
                stale_policy: if discard_stale { StalePolicy::DiscardStale } else { StalePolicy::Apply },
                ..defaults
            },
        })
    }

    /// Replace the API base URL (from a command-line flag).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] for a non-http(s) URL.
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, ConfigError> {
        self.api_url = normalize_api_url(api_url)?;
        Ok(self)
    }
}

/// Parse `key` if set, else return `default`.
pub(crate) fn env_parse<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::InvalidApiUrl(raw.to_owned()))
    }
}
