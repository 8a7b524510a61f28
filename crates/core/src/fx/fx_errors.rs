use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by an exchange-rate lookup.
///
/// Transient conditions are retried inside the exchange client and only reach
/// callers folded into [`ExchangeError::Unavailable`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    /// The request was malformed; no network call was made.
    #[error("Invalid exchange request: {0}")]
    InvalidRequest(String),

    /// The remote service permanently refused or answered nonsense.
    #[error("Exchange rate for {pair} rejected: {reason}")]
    Rejected { pair: String, reason: String },

    /// Retries ran out before a usable answer arrived.
    #[error("Exchange service unavailable for {pair} after {attempts} attempt(s) in {elapsed:?}: {last_error}")]
    Unavailable {
        pair: String,
        attempts: u32,
        elapsed: Duration,
        last_error: String,
    },
}

impl ExchangeError {
    /// True when calling again later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
