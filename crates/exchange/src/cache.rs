//! Time-bounded quote cache in front of any exchange port.

use async_trait::async_trait;
use log::{debug, warn};
use productsmgmt_core::fx::{CurrencyPair, ExchangeError, ExchangeQuote, ExchangeRateProvider};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;

struct CachedQuote {
    quote: ExchangeQuote,
    stored_at: Instant,
}

/// Caches successful quotes per pair for `ttl`. Failures are never cached.
///
/// A miss on `A/B` is answered from a fresh `B/A` entry by inverting it. A zero
/// TTL turns the cache off. The lock is only held around map access,
/// never across the inner lookup.
pub struct CachedExchangeRates {
    inner: Arc<dyn ExchangeRateProvider>,
    ttl: Duration,
    entries: RwLock<HashMap<CurrencyPair, CachedQuote>>,
}

impl CachedExchangeRates {
    pub fn new(inner: Arc<dyn ExchangeRateProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    fn lookup(&self, pair: &CurrencyPair) -> Option<ExchangeQuote> {
        let entries = self.entries.read().unwrap_or_else(|poisoned| {
            warn!("Quote cache lock poisoned during read, recovering");
            poisoned.into_inner()
        });
        if let Some(entry) = entries.get(pair).filter(|e| self.is_fresh(e)) {
            return Some(entry.quote.clone());
        }
        entries
            .get(&pair.inverse())
            .filter(|e| self.is_fresh(e))
            .and_then(|entry| entry.quote.inverse())
    }

    fn is_fresh(&self, entry: &CachedQuote) -> bool {
        entry.stored_at.elapsed() < self.ttl
    }

    fn store(&self, pair: &CurrencyPair, quote: &ExchangeQuote) {
        let mut entries = self.entries.write().unwrap_or_else(|poisoned| {
            warn!("Quote cache lock poisoned during write, recovering");
            poisoned.into_inner()
        });
        entries.insert(
            pair.clone(),
            CachedQuote {
                quote: quote.clone(),
                stored_at: Instant::now(),
            },
        );
    }

    /// Drops the cached quotes for `pair` and its inverse.
    pub fn invalidate(&self, pair: &CurrencyPair) {
        let mut entries = self.entries.write().unwrap_or_else(|poisoned| {
            warn!("Quote cache lock poisoned during invalidate, recovering");
            poisoned.into_inner()
        });
        entries.remove(pair);
        entries.remove(&pair.inverse());
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|poisoned| {
            warn!("Quote cache lock poisoned during clear, recovering");
            poisoned.into_inner()
        });
        entries.clear();
    }
}

#[async_trait]
impl ExchangeRateProvider for CachedExchangeRates {
    async fn fetch_quote(&self, pair: &CurrencyPair) -> Result<ExchangeQuote, ExchangeError> {
        if !self.is_enabled() {
            return self.inner.fetch_quote(pair).await;
        }

        if let Some(quote) = self.lookup(pair) {
            debug!("Quote cache hit for {}", pair);
            return Ok(quote);
        }

        let quote = self.inner.fetch_quote(pair).await?;
        self.store(pair, &quote);
        Ok(quote)
    }
}
