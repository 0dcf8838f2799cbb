//! Runtime configuration read once from the Lambda environment.

use std::time::Duration;

use connect_dashboard_core::replication::RegionPairing;
use thiserror::Error;

pub const REGION_ENV: &str = "AWS_REGION";
pub const PAIRED_REGION_ENV: &str = "PAIRED_REGION";
pub const MAX_ATTEMPTS_ENV: &str = "CONNECT_MAX_ATTEMPTS";
pub const INITIAL_BACKOFF_ENV: &str = "CONNECT_INITIAL_BACKOFF_MS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 2_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("LOG_FORMAT must be 'json' or 'text', got '{0}'")]
    InvalidLogFormat(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub region: Option<String>,
    pub paired_region_override: Option<String>,
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub log_format: LogFormat,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let max_attempts = match read(MAX_ATTEMPTS_ENV) {
            None => DEFAULT_MAX_ATTEMPTS,
            Some(value) => parse_positive(MAX_ATTEMPTS_ENV, &value)?,
        };
        let initial_backoff_ms = match read(INITIAL_BACKOFF_ENV) {
            None => DEFAULT_INITIAL_BACKOFF_MS,
            Some(value) => u64::from(parse_positive(INITIAL_BACKOFF_ENV, &value)?),
        };
        let log_format = match read(LOG_FORMAT_ENV).as_deref() {
            None => LogFormat::default(),
            Some(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(value) if value.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(value) => return Err(ConfigError::InvalidLogFormat(value.to_string())),
        };

        Ok(Self {
            region: read(REGION_ENV),
            paired_region_override: read(PAIRED_REGION_ENV),
            max_attempts,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            log_format,
        })
    }

    pub fn region_pairing(&self) -> RegionPairing {
        RegionPairing::resolve(self.region.clone(), self.paired_region_override.clone())
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<u32, ConfigError> {
    value
        .parse::<u32>()
        .ok()
        .filter(|parsed| *parsed > 0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        })
}
