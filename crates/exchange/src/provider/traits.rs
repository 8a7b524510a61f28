//! Rate source trait definitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use productsmgmt_core::fx::CurrencyPair;
use rust_decimal::Decimal;

use crate::errors::FetchError;

/// A rate as read from the wire, before validation.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRate {
    /// Units of the target currency per unit of the source currency.
    pub rate: Decimal,
    /// Publication time reported by the remote service, if any.
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawRate {
    pub fn new(rate: Decimal) -> Self {
        Self {
            rate,
            timestamp: None,
        }
    }
}

/// Trait for exchange-rate sources.
///
/// Implement this trait to add support for a new remote rate service. A call
/// performs exactly one network attempt; retrying is the client's job.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Unique identifier for this source, e.g. "HNB".
    ///
    /// Stored on every quote the source produces.
    fn id(&self) -> &'static str;

    /// Fetch the current rate for `pair`.
    async fn fetch_rate(&self, pair: &CurrencyPair) -> Result<RawRate, FetchError>;
}
