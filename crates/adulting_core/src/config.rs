//! Runtime configuration resolved from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `ADULTING_DB_PATH` | `<temp dir>/adulting.sqlite3` |
//! | `ADULTING_LOG_LEVEL` | `debug` in debug builds, `info` in release |
//! | `ADULTING_LOG_DIR` | unset (logging stays off) |
//! | `ADULTING_NOTIFY` | `on` |
//! | `ADULTING_STATE_URL` | `http://localhost:8000/state` |
//! | `ADULTING_NUMBER_URL` | `http://localhost:8080/api/number` |
//! | `ADULTING_NOTIFY_TIMEOUT_MS` | `2000` |
//!
//! Values are trimmed; empty values fall back to defaults.

use crate::logging::default_log_level;
use crate::notify::HttpNotifierConfig;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

const DB_FILE_NAME: &str = "adulting.sqlite3";

pub const ENV_DB_PATH: &str = "ADULTING_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "ADULTING_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ADULTING_LOG_DIR";
pub const ENV_NOTIFY: &str = "ADULTING_NOTIFY";
pub const ENV_STATE_URL: &str = "ADULTING_STATE_URL";
pub const ENV_NUMBER_URL: &str = "ADULTING_NUMBER_URL";
pub const ENV_NOTIFY_TIMEOUT_MS: &str = "ADULTING_NOTIFY_TIMEOUT_MS";

/// Configuration errors for malformed environment values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        variable: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                variable,
                value,
                expected,
            } => write!(f, "invalid {variable} value `{value}`; expected {expected}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    /// `None` disables outbound growth notifications.
    pub notify: Option<HttpNotifierConfig>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            notify: Some(HttpNotifierConfig::default()),
        }
    }
}

impl CoreConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);

        let enabled = match read(ENV_NOTIFY) {
            Some(value) => parse_switch(ENV_NOTIFY, &value)?,
            None => true,
        };
        if !enabled {
            config.notify = None;
            return Ok(config);
        }

        let mut notify = HttpNotifierConfig::default();
        if let Some(url) = read(ENV_STATE_URL) {
            notify.state_url = url;
        }
        if let Some(url) = read(ENV_NUMBER_URL) {
            notify.number_url = url;
        }
        if let Some(raw) = read(ENV_NOTIFY_TIMEOUT_MS) {
            let millis = raw
                .parse::<u64>()
                .ok()
                .filter(|millis| *millis > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    variable: ENV_NOTIFY_TIMEOUT_MS,
                    value: raw.clone(),
                    expected: "a positive integer of milliseconds",
                })?;
            notify.timeout = Duration::from_millis(millis);
        }
        config.notify = Some(notify);
        Ok(config)
    }
}

fn parse_switch(variable: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Ok(true),
        "0" | "off" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            variable,
            value: value.to_string(),
            expected: "on|off",
        }),
    }
}
