//! TOML configuration file schema and parsing.
//!
//! Credentials never live here; they come from the environment. Example:
//!
//! ```toml
//! [poller]
//! endpoint = "https://practicum.yandex.ru/api/user_api/homework_statuses/"
//! retry_interval_secs = 600
//! request_timeout_secs = 10
//! accept_list_wrapped = false
//!
//! [telegram]
//! api_base = "https://api.telegram.org"
//!
//! [log]
//! format = "json"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use review_core::config::{DEFAULT_ENDPOINT, DEFAULT_TELEGRAM_API};
use review_core::PollerConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub poller: PollerSection,

    #[serde(default)]
    pub telegram: TelegramSection,

    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollerSection {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub accept_list_wrapped: bool,
}

impl Default for PollerSection {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            retry_interval_secs: default_retry_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            accept_list_wrapped: false,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}

fn default_retry_interval_secs() -> u64 {
    600
}

fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramSection {
    #[serde(default = "default_telegram_api")]
    pub api_base: String,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            api_base: default_telegram_api(),
        }
    }
}

fn default_telegram_api() -> String {
    DEFAULT_TELEGRAM_API.into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    /// `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

fn default_log_format() -> String {
    "pretty".into()
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.log.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::Invalid(format!(
                "log.format must be \"pretty\" or \"json\", got \"{}\"",
                self.log.format
            )));
        }
        self.to_poller_config()
            .validate()
            .map_err(ConfigError::Invalid)
    }

    pub fn to_poller_config(&self) -> PollerConfig {
        PollerConfig::default()
            .with_endpoint(&self.poller.endpoint)
            .with_retry_interval(self.poller.retry_interval_secs)
            .with_request_timeout(self.poller.request_timeout_secs)
            .with_telegram_api(&self.telegram.api_base)
            .with_list_wrapped(self.poller.accept_list_wrapped)
    }
}
