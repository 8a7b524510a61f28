//! Resilient exchange-rate client for productsmgmt.
//!
//! This crate implements the core [`ExchangeRateProvider`] port on top of
//! remote rate APIs. It provides:
//!
//! - **Rate sources**: one network attempt against HNB or a generic JSON API
//! - **Retry engine**: bounded attempts, exponential backoff with jitter and a
//!   total time budget
//! - **Validation**: payload parsing and sanity checks before a quote exists
//! - **Caching**: optional per-pair TTL cache in front of the client
//!
//! # Example
//!
//! ```no_run
//! use productsmgmt_core::fx::{CurrencyPair, ExchangeRateProvider};
//! use productsmgmt_exchange::ExchangeSettings;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let exchange = ExchangeSettings::default().build()?;
//! let pair = CurrencyPair::parse("EUR", "USD")?;
//! let quote = exchange.fetch_quote(&pair).await?;
//! println!("{} = {}", quote.pair, quote.rate);
//! # Ok(())
//! # }
//! ```
//!
//! [`ExchangeRateProvider`]: productsmgmt_core::fx::ExchangeRateProvider

pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod provider;
pub mod retry;
pub mod validator;

pub use cache::CachedExchangeRates;
pub use client::{AttemptRecord, ExchangeClient, FetchReport};
pub use config::{ExchangeSettings, ProviderKind, SettingsError};
pub use errors::{FetchError, RetryClass};
pub use provider::{HnbRateSource, JsonApiRateSource, RateSource, RawRate};
pub use retry::RetryPolicy;
pub use validator::{QuoteValidator, ValidatorConfig};
