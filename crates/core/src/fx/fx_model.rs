use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::currency::CurrencyPair;
use crate::constants::DISPLAY_DECIMAL_PRECISION;

/// Result of one successful exchange-rate lookup.
///
/// `rate` converts one unit of `pair.source` into `pair.target` and is always
/// strictly positive; quotes are only built from validated payloads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeQuote {
    pub pair: CurrencyPair,
    pub rate: Decimal,
    pub fetched_at: DateTime<Utc>,
    pub source: String,
}

impl ExchangeQuote {
    pub fn new(
        pair: CurrencyPair,
        rate: Decimal,
        fetched_at: DateTime<Utc>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            pair,
            rate,
            fetched_at,
            source: source.into(),
        }
    }

    /// Quote for a pair whose source and target are the same currency.
    pub fn identity(pair: CurrencyPair, fetched_at: DateTime<Utc>) -> Self {
        Self::new(pair, Decimal::ONE, fetched_at, "IDENTITY")
    }

    /// Converts `amount` from the source currency, rounded to cents.
    ///
    /// Returns `None` when the result does not fit in a `Decimal`.
    pub fn convert(&self, amount: Decimal) -> Option<Decimal> {
        amount.checked_mul(self.rate).map(|converted| {
            converted.round_dp_with_strategy(
                DISPLAY_DECIMAL_PRECISION,
                RoundingStrategy::MidpointAwayFromZero,
            )
        })
    }

    /// The same quote seen from the other side of the pair, or `None` for a
    /// zero rate.
    pub fn inverse(&self) -> Option<Self> {
        Decimal::ONE.checked_div(self.rate).map(|rate| Self {
            pair: self.pair.inverse(),
            rate,
            fetched_at: self.fetched_at,
            source: self.source.clone(),
        })
    }
}
