//! Products Management Core - Domain entities, services, and traits.
//!
//! This crate contains the business logic for the products backend.
//! It performs no I/O: persistence and exchange-rate lookups are reached
//! through the ports implemented by the `storage-sqlite` and `exchange` crates.

pub mod constants;
pub mod errors;
pub mod fx;
pub mod pagination;
pub mod products;

// Re-export error types
pub use errors::Error;
pub use errors::ErrorKind;
pub use errors::Result;
