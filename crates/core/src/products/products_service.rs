use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::products_model::{NewProduct, PricingRefreshSummary, Product, ProductUpdate};
use super::products_traits::{ProductRepositoryTrait, ProductServiceTrait};
use crate::constants::MAX_PAGE_SIZE;
use crate::errors::{Error, Result};
use crate::fx::{CurrencyPair, ExchangeRateProvider};
use crate::pagination::{PaginatedResult, PaginationRequest};

/// Application service for products: validation, pricing and versioned writes.
#[derive(Clone)]
pub struct ProductService {
    repository: Arc<dyn ProductRepositoryTrait>,
    exchange: Arc<dyn ExchangeRateProvider>,
}

impl ProductService {
    pub fn new(
        repository: Arc<dyn ProductRepositoryTrait>,
        exchange: Arc<dyn ExchangeRateProvider>,
    ) -> Self {
        Self {
            repository,
            exchange,
        }
    }

    fn load_all(&self) -> Result<Vec<Product>> {
        let mut products = Vec::new();
        let mut request = PaginationRequest::new(0, MAX_PAGE_SIZE);
        loop {
            let page = self.repository.find_all(&request)?;
            let fetched = page.items.len();
            products.extend(page.items);
            if fetched == 0 || request.page + 1 >= page.total_pages {
                break;
            }
            request.page += 1;
        }
        Ok(products)
    }

    /// Saves a re-priced product and classifies the outcome for the batch summary.
    async fn save_repriced(&self, product: Product, summary: &mut PricingRefreshSummary) {
        let id = product.id;
        let expected_version = product.version;
        match self.repository.save(product, expected_version).await {
            Ok(_) => summary.updated += 1,
            Err(e) if e.is_concurrent_modification() => {
                debug!("Skipping product {}: {}", id, e);
                summary.conflicts += 1;
            }
            Err(e) => {
                warn!("Failed to save refreshed pricing for product {}: {}", id, e);
                summary.failed_products += 1;
            }
        }
    }
}

#[async_trait]
impl ProductServiceTrait for ProductService {
    fn get_product_by_id(&self, id: i64) -> Result<Product> {
        self.repository.load(id)
    }

    fn get_product_by_code(&self, code: &str) -> Result<Product> {
        let code = code.trim();
        self.repository
            .find_by_code(code)?
            .ok_or_else(|| Error::ProductNotFound(format!("Product with code {} not found", code)))
    }

    fn get_all_products(&self, request: PaginationRequest) -> Result<PaginatedResult<Product>> {
        request.validate()?;
        self.repository.find_all(&request)
    }

    async fn create_new_product(&self, new_product: NewProduct) -> Result<Product> {
        new_product.validate()?;
        let code = new_product.code.trim().to_string();
        if self.repository.code_exists(&code)? {
            return Err(Error::DuplicateProductCode(code));
        }

        let mut product = Product::from_new(new_product, Utc::now());
        let quote = self.exchange.fetch_quote(&product.pair()).await?;
        product.apply_quote(quote)?;

        let created = self.repository.insert(product).await?;
        info!(
            "Created product {} ({}) priced {} {} / {:?} {}",
            created.id,
            created.code,
            created.price,
            created.currency,
            created.converted_price,
            created.target_currency
        );
        Ok(created)
    }

    async fn refresh_product_pricing(&self, id: i64) -> Result<Product> {
        let mut product = self.repository.load(id)?;
        let expected_version = product.version;

        let quote = self.exchange.fetch_quote(&product.pair()).await?;
        product.apply_quote(quote)?;
        product.updated_at = Utc::now();

        let saved = self.repository.save(product, expected_version).await?;
        debug!(
            "Refreshed pricing for product {} to {:?} (version {})",
            saved.id, saved.converted_price, saved.version
        );
        Ok(saved)
    }

    async fn update_product(
        &self,
        id: i64,
        update: ProductUpdate,
        expected_version: i64,
    ) -> Result<Product> {
        update.validate()?;
        let mut product = self.repository.load(id)?;
        if product.version != expected_version {
            return Err(Error::ConcurrentModification {
                product_id: id,
                expected_version,
                actual_version: Some(product.version),
            });
        }
        if update.is_empty() {
            return Ok(product);
        }

        product.apply_update(update)?;
        product.updated_at = Utc::now();
        self.repository.save(product, expected_version).await
    }

    async fn refresh_all_pricing(&self) -> Result<PricingRefreshSummary> {
        let products = self.load_all()?;
        let mut by_pair: BTreeMap<CurrencyPair, Vec<Product>> = BTreeMap::new();
        for product in products {
            by_pair.entry(product.pair()).or_default().push(product);
        }
        info!(
            "Refreshing pricing for {} product(s) across {} currency pair(s)",
            by_pair.values().map(Vec::len).sum::<usize>(),
            by_pair.len()
        );

        let quotes = join_all(by_pair.keys().map(|pair| self.exchange.fetch_quote(pair))).await;

        let mut summary = PricingRefreshSummary::default();
        for ((pair, products), quote) in by_pair.into_iter().zip(quotes) {
            let quote = match quote {
                Ok(quote) => quote,
                Err(e) => {
                    warn!("Skipping {} product(s) priced in {}: {}", products.len(), pair, e);
                    summary.failed_products += products.len();
                    summary.failed_pairs.push(pair.to_string());
                    continue;
                }
            };

            for mut product in products {
                if let Err(e) = product.apply_quote(quote.clone()) {
                    warn!("Cannot apply quote to product {}: {}", product.id, e);
                    summary.failed_products += 1;
                    continue;
                }
                product.updated_at = Utc::now();
                self.save_repriced(product, &mut summary).await;
            }
        }

        info!(
            "Pricing refresh finished: {} updated, {} conflicts, {} failed, failed pairs: {:?}",
            summary.updated, summary.conflicts, summary.failed_products, summary.failed_pairs
        );
        Ok(summary)
    }
}
