//! Exchange client: drives a [`RateSource`] through the retry state machine.
//!
//! One `fetch_quote` call is one logical lookup. Attempts run under
//! `min(attempt_timeout, remaining budget)`, failures are classified, and the
//! caller only ever sees a validated quote or a core `ExchangeError`.

mod diagnostics;

pub use diagnostics::{AttemptRecord, FetchReport};

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use productsmgmt_core::fx::{CurrencyPair, ExchangeError, ExchangeQuote, ExchangeRateProvider};
use std::sync::Arc;
use tokio::time::Instant;

use crate::errors::FetchError;
use crate::provider::RateSource;
use crate::retry::{
    Backoff, Jitter, RandomJitter, RetryDecision, RetryPolicy, Sleeper, StopReason, TokioSleeper,
};
use crate::validator::QuoteValidator;

/// Source id recorded on quotes for identity pairs.
const IDENTITY_SOURCE: &str = "IDENTITY";

#[derive(Clone)]
pub struct ExchangeClient {
    source: Arc<dyn RateSource>,
    policy: RetryPolicy,
    validator: QuoteValidator,
    sleeper: Arc<dyn Sleeper>,
    jitter: Arc<dyn Jitter>,
}

impl ExchangeClient {
    pub fn new(source: Arc<dyn RateSource>, policy: RetryPolicy) -> Self {
        Self {
            source,
            policy,
            validator: QuoteValidator::new(),
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(RandomJitter),
        }
    }

    /// Replaces the sleeping and jitter strategies.
    pub fn with_runtime(mut self, sleeper: Arc<dyn Sleeper>, jitter: Arc<dyn Jitter>) -> Self {
        self.sleeper = sleeper;
        self.jitter = jitter;
        self
    }

    pub fn with_validator(mut self, validator: QuoteValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn source_id(&self) -> &'static str {
        self.source.id()
    }

    /// Looks up a quote from raw currency codes.
    ///
    /// Malformed codes fail with `InvalidRequest` before any network call.
    pub async fn fetch_quote_by_codes(
        &self,
        source: &str,
        target: &str,
    ) -> Result<ExchangeQuote, ExchangeError> {
        let pair = CurrencyPair::parse(source, target)
            .map_err(|e| ExchangeError::InvalidRequest(e.to_string()))?;
        self.fetch_quote(&pair).await
    }

    /// Looks up a quote and returns the per-attempt account alongside it.
    pub async fn fetch_quote_with_report(
        &self,
        pair: &CurrencyPair,
    ) -> (Result<ExchangeQuote, ExchangeError>, FetchReport) {
        let started = Instant::now();

        if pair.is_identity() {
            let report = FetchReport::new(pair.to_string(), IDENTITY_SOURCE);
            return (Ok(ExchangeQuote::identity(pair.clone(), Utc::now())), report);
        }

        let mut report = FetchReport::new(pair.to_string(), self.source.id());
        let mut backoff = Backoff::new(&self.policy, self.jitter.as_ref());

        let result = loop {
            let number = backoff.begin_attempt();
            let outcome = self.run_single_attempt(pair, started).await;

            let error = match outcome {
                Ok(quote) => {
                    report.record_success(number);
                    break Ok(quote);
                }
                Err(error) => error,
            };

            let class = error.retry_class();
            match backoff.on_failure(class, error.retry_after(), started.elapsed()) {
                RetryDecision::Retry { delay } => {
                    debug!(
                        "Attempt {} for {} failed ({}), retrying in {:?}",
                        number, pair, error, delay
                    );
                    report.record_failure(number, class, error.to_string(), Some(delay));
                    self.sleeper.sleep(delay).await;
                }
                RetryDecision::Stop(reason) => {
                    report.record_failure(number, class, error.to_string(), None);
                    break Err(self.give_up(pair, reason, number, started, &error));
                }
            }
        };

        report.elapsed = started.elapsed();
        (result, report)
    }

    /// One network attempt, bounded by the attempt deadline, then validation.
    async fn run_single_attempt(
        &self,
        pair: &CurrencyPair,
        started: Instant,
    ) -> Result<ExchangeQuote, FetchError> {
        let deadline = self.policy.attempt_deadline(started.elapsed());
        if deadline.is_zero() {
            return Err(FetchError::Timeout);
        }

        let raw = match tokio::time::timeout(deadline, self.source.fetch_rate(pair)).await {
            Ok(result) => result?,
            Err(_) => return Err(FetchError::Timeout),
        };
        self.validator
            .build_quote(pair, raw, self.source.id(), Utc::now())
    }

    fn give_up(
        &self,
        pair: &CurrencyPair,
        reason: StopReason,
        attempts: u32,
        started: Instant,
        error: &FetchError,
    ) -> ExchangeError {
        match reason {
            StopReason::NonRetriable => ExchangeError::Rejected {
                pair: pair.to_string(),
                reason: error.to_string(),
            },
            StopReason::AttemptsExhausted | StopReason::BudgetExhausted => {
                ExchangeError::Unavailable {
                    pair: pair.to_string(),
                    attempts,
                    elapsed: started.elapsed(),
                    last_error: error.to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl ExchangeRateProvider for ExchangeClient {
    async fn fetch_quote(&self, pair: &CurrencyPair) -> Result<ExchangeQuote, ExchangeError> {
        let (result, report) = self.fetch_quote_with_report(pair).await;
        match &result {
            Ok(quote) => {
                info!("Fetched {} = {} from {}", pair, quote.rate, quote.source);
                debug!("{}", report.summary());
            }
            Err(e) => warn!("Exchange lookup failed: {} [{}]", e, report.summary()),
        }
        result
    }
}
