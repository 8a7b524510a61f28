//! SQLite storage implementation for productsmgmt.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `productsmgmt-core` and contains:
//! - Database connection pooling and schema bootstrap
//! - A single writer task that runs write jobs in immediate transactions
//! - The product repository with versioned (optimistic) saves
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! `core` is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod products;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, init_schema, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from productsmgmt-core for convenience
pub use productsmgmt_core::errors::{DatabaseError, Error, Result};
