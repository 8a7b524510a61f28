//! FX (Foreign Exchange) module - currency codes, quotes, and the exchange port.

pub mod currency;
mod fx_errors;
mod fx_model;
mod fx_traits;

pub use currency::{CurrencyCode, CurrencyPair, SupportedCurrency};
pub use fx_errors::ExchangeError;
pub use fx_model::ExchangeQuote;
pub use fx_traits::ExchangeRateProvider;
