//! Quote data validation.
//!
//! Validates raw rates from sources before they become quotes:
//! - Strictly positive rate
//! - Rate below a sanity bound
//! - Remote timestamp not implausibly far in the future

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use log::warn;
use productsmgmt_core::fx::{CurrencyPair, ExchangeQuote};
use rust_decimal::Decimal;

use crate::errors::FetchError;
use crate::provider::RawRate;

/// Quote validator configuration.
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// Largest rate accepted (sanity check against unit or parsing mistakes).
    pub max_rate: Decimal,
    /// How far ahead of the local clock a remote timestamp may be.
    pub max_future_skew: ChronoDuration,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_rate: Decimal::from(1_000_000i64),
            max_future_skew: ChronoDuration::days(1),
        }
    }
}

/// Raw rate validator.
#[derive(Clone, Debug, Default)]
pub struct QuoteValidator {
    config: ValidatorConfig,
}

impl QuoteValidator {
    /// Create a new validator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with custom configuration.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a raw rate.
    ///
    /// All problems are collected and reported together as one `InvalidRate`.
    pub fn validate(&self, raw: &RawRate, now: DateTime<Utc>) -> Result<(), FetchError> {
        let mut issues: Vec<String> = Vec::new();

        if raw.rate <= Decimal::ZERO {
            issues.push(format!("rate must be positive, got {}", raw.rate));
        } else if raw.rate > self.config.max_rate {
            issues.push(format!(
                "rate {} exceeds sanity bound {}",
                raw.rate, self.config.max_rate
            ));
        }

        if let Some(ts) = raw.timestamp {
            if ts > now + self.config.max_future_skew {
                issues.push(format!("timestamp {} is in the future", ts.to_rfc3339()));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            let message = issues.join("; ");
            warn!("Rejecting exchange rate: {}", message);
            Err(FetchError::InvalidRate(message))
        }
    }

    /// Validate `raw` and build the quote for `pair`.
    pub fn build_quote(
        &self,
        pair: &CurrencyPair,
        raw: RawRate,
        source_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ExchangeQuote, FetchError> {
        self.validate(&raw, now)?;
        Ok(ExchangeQuote::new(
            pair.clone(),
            raw.rate,
            raw.timestamp.unwrap_or(now),
            source_id,
        ))
    }
}
