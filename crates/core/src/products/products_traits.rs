//! Product repository and service traits.
//!
//! These traits define the contract for product operations without any
//! database-specific types, allowing for different storage implementations.

use async_trait::async_trait;

use super::products_model::{NewProduct, PricingRefreshSummary, Product, ProductUpdate};
use crate::errors::Result;
use crate::pagination::{PaginatedResult, PaginationRequest};

/// Trait defining the contract for Product repository operations.
///
/// Reads are synchronous; writes go through the storage writer and are async.
#[async_trait]
pub trait ProductRepositoryTrait: Send + Sync {
    /// Loads a product by id, failing with `ProductNotFound` when absent.
    fn load(&self, id: i64) -> Result<Product>;

    fn find_by_code(&self, code: &str) -> Result<Option<Product>>;

    fn code_exists(&self, code: &str) -> Result<bool>;

    fn find_all(&self, request: &PaginationRequest) -> Result<PaginatedResult<Product>>;

    /// Persists a new product. The id is assigned here and the stored version is 1.
    ///
    /// A duplicate code fails with `DuplicateProductCode`.
    async fn insert(&self, product: Product) -> Result<Product>;

    /// Stores `product` if the stored version still equals `expected_version`.
    ///
    /// On success the returned product carries `expected_version + 1`. A stale
    /// version fails with `ConcurrentModification` and leaves the row untouched.
    async fn save(&self, product: Product, expected_version: i64) -> Result<Product>;
}

/// Trait defining the contract for Product service operations.
#[async_trait]
pub trait ProductServiceTrait: Send + Sync {
    fn get_product_by_id(&self, id: i64) -> Result<Product>;

    fn get_product_by_code(&self, code: &str) -> Result<Product>;

    fn get_all_products(&self, request: PaginationRequest) -> Result<PaginatedResult<Product>>;

    /// Validates, prices and stores a new product. Nothing is stored when the
    /// exchange lookup fails.
    async fn create_new_product(&self, new_product: NewProduct) -> Result<Product>;

    /// Re-prices one product with a fresh quote.
    async fn refresh_product_pricing(&self, id: i64) -> Result<Product>;

    /// Applies a partial update against the version the caller last saw.
    async fn update_product(
        &self,
        id: i64,
        update: ProductUpdate,
        expected_version: i64,
    ) -> Result<Product>;

    /// Re-prices every product, fetching each currency pair once.
    async fn refresh_all_pricing(&self) -> Result<PricingRefreshSummary>;
}
