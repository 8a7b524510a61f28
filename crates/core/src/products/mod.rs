//! Products module - domain models, services, and traits.

mod products_model;
mod products_service;
mod products_traits;


// Re-export the public interface
pub use products_model::{NewProduct, PricingRefreshSummary, Product, ProductUpdate};
pub use products_service::ProductService;
pub use products_traits::{ProductRepositoryTrait, ProductServiceTrait};
