use async_trait::async_trait;

use super::currency::CurrencyPair;
use super::fx_errors::ExchangeError;
use super::fx_model::ExchangeQuote;

/// Port through which the domain obtains exchange rates.
#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Returns a validated quote for `pair`, or a classified failure.
    async fn fetch_quote(&self, pair: &CurrencyPair) -> Result<ExchangeQuote, ExchangeError>;
}
