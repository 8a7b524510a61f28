//! Exchange client settings and assembly.

use productsmgmt_core::fx::ExchangeRateProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::cache::CachedExchangeRates;
use crate::client::ExchangeClient;
use crate::provider::{hnb, json_api, HnbRateSource, JsonApiRateSource, RateSource};
use crate::retry::RetryPolicy;
use crate::validator::{QuoteValidator, ValidatorConfig};

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("Unknown exchange provider '{0}', expected 'hnb' or 'json'")]
    UnknownProvider(String),

    #[error("Exchange provider '{0}' requires a base URL")]
    MissingBaseUrl(ProviderKind),

    #[error("Invalid retry settings: {0}")]
    InvalidRetry(String),

    #[error("Invalid max rate: {0}")]
    InvalidMaxRate(Decimal),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Hnb,
    Json,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Hnb => write!(f, "hnb"),
            ProviderKind::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hnb" => Ok(ProviderKind::Hnb),
            "json" | "json_api" => Ok(ProviderKind::Json),
            other => Err(SettingsError::UnknownProvider(other.to_string())),
        }
    }
}

/// Everything needed to assemble the exchange port.
///
/// Durations are plain integers so the struct maps one-to-one onto
/// environment variables and JSON settings files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExchangeSettings {
    pub provider: ProviderKind,
    /// Falls back to the public HNB host for `hnb`; required for `json`.
    pub base_url: Option<String>,
    pub uri_path: Option<String>,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub max_elapsed_ms: u64,
    pub attempt_timeout_ms: u64,
    pub jitter_ratio: f64,
    pub max_rate: Decimal,
    /// Zero disables the quote cache.
    pub cache_ttl_secs: u64,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            provider: ProviderKind::default(),
            base_url: None,
            uri_path: None,
            max_attempts: policy.max_attempts,
            initial_backoff_ms: millis(policy.initial_backoff),
            max_backoff_ms: millis(policy.max_backoff),
            max_elapsed_ms: millis(policy.max_elapsed),
            attempt_timeout_ms: millis(policy.attempt_timeout),
            jitter_ratio: policy.jitter_ratio,
            max_rate: ValidatorConfig::default().max_rate,
            cache_ttl_secs: 0,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl ExchangeSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            jitter_ratio: self.jitter_ratio,
            max_elapsed: Duration::from_millis(self.max_elapsed_ms),
            attempt_timeout: Duration::from_millis(self.attempt_timeout_ms),
        }
    }

    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            max_rate: self.max_rate,
            ..ValidatorConfig::default()
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.retry_policy()
            .validate()
            .map_err(SettingsError::InvalidRetry)?;
        if self.max_rate <= Decimal::ZERO {
            return Err(SettingsError::InvalidMaxRate(self.max_rate));
        }
        if self.provider == ProviderKind::Json
            && self.base_url.as_deref().map_or(true, |url| url.trim().is_empty())
        {
            return Err(SettingsError::MissingBaseUrl(self.provider));
        }
        Ok(())
    }

    /// Builds the configured rate source.
    pub fn rate_source(&self) -> Result<Arc<dyn RateSource>, SettingsError> {
        self.validate()?;
        let timeout = Duration::from_millis(self.attempt_timeout_ms);

        let source: Arc<dyn RateSource> = match self.provider {
            ProviderKind::Hnb => Arc::new(HnbRateSource::new(
                self.base_url.as_deref().unwrap_or(hnb::DEFAULT_BASE_URL),
                self.uri_path.as_deref().unwrap_or(hnb::DEFAULT_URI_PATH),
                timeout,
            )),
            ProviderKind::Json => Arc::new(JsonApiRateSource::new(
                self.base_url.clone().unwrap_or_default(),
                self.uri_path.as_deref().unwrap_or(json_api::DEFAULT_URI_PATH),
                timeout,
            )),
        };
        Ok(source)
    }

    pub fn client(&self) -> Result<ExchangeClient, SettingsError> {
        Ok(ExchangeClient::new(self.rate_source()?, self.retry_policy())
            .with_validator(QuoteValidator::with_config(self.validator_config())))
    }

    /// Assembles the exchange port, wrapped in the quote cache when a TTL is set.
    pub fn build(&self) -> Result<Arc<dyn ExchangeRateProvider>, SettingsError> {
        let client = self.client()?;
        if self.cache_ttl_secs == 0 {
            return Ok(Arc::new(client));
        }
        Ok(Arc::new(CachedExchangeRates::new(
            Arc::new(client),
            self.cache_ttl(),
        )))
    }
}
