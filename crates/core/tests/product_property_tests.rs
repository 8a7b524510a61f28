//! Property-based integration tests for product pricing.
//!
//! These tests verify that pricing and versioning invariants hold across
//! random inputs, using the `proptest` crate for test case generation.

use async_trait::async_trait;
use chrono::Utc;
use productsmgmt_core::fx::{
    CurrencyCode, CurrencyPair, ExchangeError, ExchangeQuote, ExchangeRateProvider,
};
use productsmgmt_core::pagination::{PaginatedResult, PaginationRequest};
use productsmgmt_core::products::{
    NewProduct, Product, ProductRepositoryTrait, ProductService, ProductServiceTrait,
};
use productsmgmt_core::{Error, Result};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// Generators
// =============================================================================

/// Generates a non-negative price with up to 4 decimal places.
fn arb_price() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000, 0u32..=4).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

/// Generates a strictly positive exchange rate.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000, 0u32..=6).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

#[derive(Clone, Debug)]
enum Outcome {
    Quote(Decimal),
    Unavailable,
    Rejected,
}

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        arb_rate().prop_map(Outcome::Quote),
        Just(Outcome::Unavailable),
        Just(Outcome::Rejected),
    ]
}

// =============================================================================
// Single-product fakes
// =============================================================================

#[derive(Clone, Default)]
struct SingleProductRepository {
    product: Arc<Mutex<Option<Product>>>,
    fail_on_save: Arc<Mutex<bool>>,
}

#[async_trait]
impl ProductRepositoryTrait for SingleProductRepository {
    fn load(&self, id: i64) -> Result<Product> {
        self.product
            .lock()
            .unwrap()
            .clone()
            .filter(|p| p.id == id)
            .ok_or_else(|| Error::ProductNotFound(id.to_string()))
    }

    fn find_by_code(&self, code: &str) -> Result<Option<Product>> {
        Ok(self.product.lock().unwrap().clone().filter(|p| p.code == code))
    }

    fn code_exists(&self, code: &str) -> Result<bool> {
        Ok(self.find_by_code(code)?.is_some())
    }

    fn find_all(&self, request: &PaginationRequest) -> Result<PaginatedResult<Product>> {
        let items: Vec<Product> = self.product.lock().unwrap().iter().cloned().collect();
        let total = items.len() as i64;
        Ok(PaginatedResult::new(items, total, request.size))
    }

    async fn insert(&self, mut product: Product) -> Result<Product> {
        product.id = 1;
        product.version = 1;
        *self.product.lock().unwrap() = Some(product.clone());
        Ok(product)
    }

    async fn save(&self, mut product: Product, expected_version: i64) -> Result<Product> {
        if *self.fail_on_save.lock().unwrap() {
            return Err(Error::Unexpected("injected".into()));
        }
        let mut slot = self.product.lock().unwrap();
        let actual = slot.as_ref().map(|p| p.version);
        if actual != Some(expected_version) {
            return Err(Error::ConcurrentModification {
                product_id: product.id,
                expected_version,
                actual_version: actual,
            });
        }
        product.version = expected_version + 1;
        *slot = Some(product.clone());
        Ok(product)
    }
}

#[derive(Clone)]
struct ScriptedExchange {
    outcome: Arc<Mutex<Outcome>>,
}

#[async_trait]
impl ExchangeRateProvider for ScriptedExchange {
    async fn fetch_quote(
        &self,
        pair: &CurrencyPair,
    ) -> std::result::Result<ExchangeQuote, ExchangeError> {
        match self.outcome.lock().unwrap().clone() {
            Outcome::Quote(rate) => Ok(ExchangeQuote::new(pair.clone(), rate, Utc::now(), "TEST")),
            Outcome::Unavailable => Err(ExchangeError::Unavailable {
                pair: pair.to_string(),
                attempts: 3,
                elapsed: Duration::from_secs(1),
                last_error: "timeout".into(),
            }),
            Outcome::Rejected => Err(ExchangeError::Rejected {
                pair: pair.to_string(),
                reason: "HTTP 400".into(),
            }),
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Converted amounts carry at most two decimals and stay within half a cent
    /// of the exact product.
    #[test]
    fn prop_convert_rounds_to_cents(price in arb_price(), rate in arb_rate()) {
        let quote = ExchangeQuote::new(
            CurrencyPair::parse("EUR", "USD").unwrap(),
            rate,
            Utc::now(),
            "TEST",
        );
        let converted = quote.convert(price).unwrap();
        prop_assert!(converted.scale() <= 2);
        prop_assert!((converted - price * rate).abs() <= Decimal::new(5, 3));
        prop_assert!(!converted.is_sign_negative() || converted.is_zero());
    }

    /// Any three ASCII letters form a code, normalised to upper case.
    #[test]
    fn prop_currency_code_normalises(raw in "[a-zA-Z]{3}") {
        let code = CurrencyCode::parse(&raw).unwrap();
        prop_assert_eq!(code.as_str(), raw.to_ascii_uppercase());
    }

    /// Anything other than exactly three letters is rejected.
    #[test]
    fn prop_currency_code_rejects_other_lengths(raw in "[A-Z]{0,2}|[A-Z]{4,8}") {
        prop_assert!(CurrencyCode::parse(&raw).is_err());
    }

    /// Page counts cover every element without an empty trailing page.
    #[test]
    fn prop_total_pages_cover_elements(total in 0i64..10_000, size in 1i64..=100) {
        let result: PaginatedResult<()> = PaginatedResult::new(Vec::new(), total, size);
        prop_assert!(result.total_pages * size >= total);
        prop_assert!(result.total_pages == 0 || (result.total_pages - 1) * size < total);
    }

    /// A refresh either bumps the version with a rate-adjusted price or leaves
    /// the stored product exactly as it was.
    #[test]
    fn prop_refresh_is_all_or_nothing(
        price in arb_price(),
        initial_rate in arb_rate(),
        outcome in arb_outcome(),
        fail_on_save in any::<bool>(),
    ) {
        let repository = SingleProductRepository::default();
        let exchange = ScriptedExchange {
            outcome: Arc::new(Mutex::new(Outcome::Quote(initial_rate))),
        };
        let service = ProductService::new(
            Arc::new(repository.clone()),
            Arc::new(exchange.clone()),
        );

        let rt = runtime();
        let created = rt
            .block_on(service.create_new_product(NewProduct::new("PROPTEST01", "Widget", price)))
            .unwrap();

        *exchange.outcome.lock().unwrap() = outcome.clone();
        *repository.fail_on_save.lock().unwrap() = fail_on_save;
        let result = rt.block_on(service.refresh_product_pricing(created.id));
        let stored = repository.product.lock().unwrap().clone().unwrap();

        match (outcome, fail_on_save) {
            (Outcome::Quote(rate), false) => {
                let refreshed = result.unwrap();
                prop_assert_eq!(refreshed.version, created.version + 1);
                prop_assert_eq!(
                    refreshed.converted_price,
                    ExchangeQuote::new(created.pair(), rate, Utc::now(), "TEST").convert(price)
                );
                prop_assert_eq!(stored, refreshed);
            }
            _ => {
                prop_assert!(result.is_err());
                prop_assert_eq!(stored, created);
            }
        }
    }
}
