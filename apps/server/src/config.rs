use std::str::FromStr;
use std::time::Duration;

use productsmgmt_exchange::{ExchangeSettings, ProviderKind};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid exchange configuration: {0}")]
    Exchange(String),
}

/// Log output format selected by `PM_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}', expected text or json", other)),
        }
    }
}

pub struct Config {
    pub db_path: String,
    pub exchange: ExchangeSettings,
    pub refresh_interval: Duration,
    pub log_format: LogFormat,
}

const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60 * 60;

impl Config {
    /// Reads configuration from the process environment, after loading `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = var("PM_DB_PATH").unwrap_or_else(|| "./db/products.db".into());
        let log_format = parse_or("PM_LOG_FORMAT", var("PM_LOG_FORMAT"), LogFormat::default())?;

        let defaults = ExchangeSettings::default();
        let exchange = ExchangeSettings {
            provider: parse_or("PM_EXCHANGE_PROVIDER", var("PM_EXCHANGE_PROVIDER"), defaults.provider)?,
            base_url: var("PM_EXCHANGE_BASE_URL"),
            uri_path: var("PM_EXCHANGE_URI_PATH"),
            max_attempts: parse_or(
                "PM_RETRY_MAX_ATTEMPTS",
                var("PM_RETRY_MAX_ATTEMPTS"),
                defaults.max_attempts,
            )?,
            initial_backoff_ms: parse_or(
                "PM_RETRY_INITIAL_BACKOFF_MS",
                var("PM_RETRY_INITIAL_BACKOFF_MS"),
                defaults.initial_backoff_ms,
            )?,
            max_backoff_ms: parse_or(
                "PM_RETRY_MAX_BACKOFF_MS",
                var("PM_RETRY_MAX_BACKOFF_MS"),
                defaults.max_backoff_ms,
            )?,
            max_elapsed_ms: parse_or(
                "PM_RETRY_MAX_ELAPSED_MS",
                var("PM_RETRY_MAX_ELAPSED_MS"),
                defaults.max_elapsed_ms,
            )?,
            attempt_timeout_ms: parse_or(
                "PM_ATTEMPT_TIMEOUT_MS",
                var("PM_ATTEMPT_TIMEOUT_MS"),
                defaults.attempt_timeout_ms,
            )?,
            jitter_ratio: parse_or(
                "PM_RETRY_JITTER_RATIO",
                var("PM_RETRY_JITTER_RATIO"),
                defaults.jitter_ratio,
            )?,
            max_rate: parse_or::<Decimal>("PM_MAX_RATE", var("PM_MAX_RATE"), defaults.max_rate)?,
            cache_ttl_secs: parse_or(
                "PM_QUOTE_CACHE_TTL_SECS",
                var("PM_QUOTE_CACHE_TTL_SECS"),
                defaults.cache_ttl_secs,
            )?,
        };
        exchange
            .validate()
            .map_err(|e| ConfigError::Exchange(e.to_string()))?;

        let refresh_secs: u64 = parse_or(
            "PM_REFRESH_INTERVAL_SECS",
            var("PM_REFRESH_INTERVAL_SECS"),
            DEFAULT_REFRESH_INTERVAL_SECS,
        )?;
        if refresh_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "PM_REFRESH_INTERVAL_SECS",
                value: "0".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }

        Ok(Self {
            db_path,
            exchange,
            refresh_interval: Duration::from_secs(refresh_secs),
            log_format,
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
