//! Core error types for the products management application.
//!
//! This module defines storage-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer,
//! and exchange client failures arrive already classified as [`ExchangeError`].

use thiserror::Error;

use crate::fx::ExchangeError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the products application.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Exchange rate lookup failed: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("{0}")]
    ProductNotFound(String),

    #[error("Product with the code {0} already exists")]
    DuplicateProductCode(String),

    /// The stored version no longer matches the one read at the start of the
    /// operation. Callers decide whether to re-read and retry.
    #[error("Product {product_id} was modified concurrently (expected version {expected_version}, found {})",
        .actual_version.map(|v| v.to_string()).unwrap_or_else(|| "none".to_string())
    )]
    ConcurrentModification {
        product_id: i64,
        expected_version: i64,
        actual_version: Option<i64>,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Coarse error classes an inbound adapter can map onto its own status codes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The caller sent something invalid.
    InvalidInput,
    /// The addressed product does not exist.
    NotFound,
    /// Duplicate code or lost update.
    Conflict,
    /// The exchange service is temporarily unavailable; retry later.
    Upstream,
    /// The exchange service permanently rejected the request.
    UpstreamRejected,
    /// Anything else.
    Internal,
}

impl Error {
    /// Returns the adapter-facing class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::InvalidInput,
            Self::ProductNotFound(_) => ErrorKind::NotFound,
            Self::DuplicateProductCode(_) | Self::ConcurrentModification { .. } => {
                ErrorKind::Conflict
            }
            Self::Exchange(ExchangeError::InvalidRequest(_)) => ErrorKind::InvalidInput,
            Self::Exchange(ExchangeError::Rejected { .. }) => ErrorKind::UpstreamRejected,
            Self::Exchange(ExchangeError::Unavailable { .. }) => ErrorKind::Upstream,
            Self::Database(DatabaseError::NotFound(_)) => ErrorKind::NotFound,
            Self::Database(DatabaseError::UniqueViolation(_)) => ErrorKind::Conflict,
            Self::Database(_) | Self::Unexpected(_) => ErrorKind::Internal,
        }
    }

    pub fn is_concurrent_modification(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }
}

/// Storage-agnostic error type for repository operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Invalid currency code '{0}': expected three ASCII letters")]
    InvalidCurrencyCode(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
