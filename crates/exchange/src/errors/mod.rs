//! Error types and retry classification for the exchange crate.
//!
//! This module provides:
//! - [`FetchError`]: The outcome of one failed attempt against a rate source
//! - [`RetryClass`]: Classification for determining retry behavior
//!
//! `FetchError` never leaves the crate's client: callers only see the core
//! `ExchangeError` the retry engine folds it into.

mod retry;

pub use retry::RetryClass;

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a single rate-source attempt.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which determines how the retry engine handles the error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The attempt did not finish within its deadline.
    #[error("Request timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The connection broke while sending or reading.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a 5xx status.
    #[error("HTTP {status}: {body}")]
    ServerError { status: u16, body: String },

    /// The service answered with HTTP 429.
    #[error("Rate limited{}", .retry_after.map(|d| format!(" (retry after {}s)", d.as_secs())).unwrap_or_default())]
    RateLimited { retry_after: Option<Duration> },

    /// The service answered with a 4xx status other than 429.
    #[error("HTTP {status}: {body}")]
    ClientError { status: u16, body: String },

    /// The body could not be mapped to a rate.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// A rate was parsed but fails the sanity checks.
    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    /// The source cannot quote this pair.
    #[error("Unsupported currency pair: {0}")]
    UnsupportedPair(String),
}

impl FetchError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use productsmgmt_exchange::errors::{FetchError, RetryClass};
    ///
    /// let error = FetchError::ServerError { status: 503, body: String::new() };
    /// assert_eq!(error.retry_class(), RetryClass::Retriable);
    ///
    /// let error = FetchError::ClientError { status: 400, body: "unknown pair".into() };
    /// assert_eq!(error.retry_class(), RetryClass::NonRetriable);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            // Transient errors - retry with backoff
            Self::Timeout | Self::Connect(_) | Self::Transport(_) | Self::ServerError { .. } => {
                RetryClass::Retriable
            }

            Self::RateLimited { .. } => RetryClass::RateLimited,

            // Terminal errors - never retry
            Self::ClientError { .. }
            | Self::MalformedPayload(_)
            | Self::InvalidRate(_)
            | Self::UnsupportedPair(_) => RetryClass::NonRetriable,
        }
    }

    /// Server-provided minimum wait before the next attempt, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Maps a transport-level `reqwest` failure.
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else if error.is_decode() {
            Self::MalformedPayload(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_retriable() {
        assert_eq!(FetchError::Timeout.retry_class(), RetryClass::Retriable);
    }

    #[test]
    fn test_connection_failures_are_retriable() {
        let error = FetchError::Connect("connection refused".to_string());
        assert_eq!(error.retry_class(), RetryClass::Retriable);

        let error = FetchError::Transport("connection reset by peer".to_string());
        assert_eq!(error.retry_class(), RetryClass::Retriable);
    }

    #[test]
    fn test_server_errors_are_retriable() {
        for status in [500, 502, 503, 504] {
            let error = FetchError::ServerError {
                status,
                body: String::new(),
            };
            assert_eq!(error.retry_class(), RetryClass::Retriable);
        }
    }

    #[test]
    fn test_rate_limited_carries_retry_after() {
        let error = FetchError::RateLimited {
            retry_after: Some(Duration::from_secs(2)),
        };
        assert_eq!(error.retry_class(), RetryClass::RateLimited);
        assert!(error.retry_class().is_retriable());
        assert_eq!(error.retry_after(), Some(Duration::from_secs(2)));
        assert_eq!(FetchError::Timeout.retry_after(), None);
    }

    #[test]
    fn test_client_errors_never_retry() {
        let error = FetchError::ClientError {
            status: 400,
            body: "unknown pair".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::NonRetriable);
        assert!(!error.retry_class().is_retriable());
    }

    #[test]
    fn test_payload_problems_never_retry() {
        assert_eq!(
            FetchError::MalformedPayload("missing rate".into()).retry_class(),
            RetryClass::NonRetriable
        );
        assert_eq!(
            FetchError::InvalidRate("rate must be positive".into()).retry_class(),
            RetryClass::NonRetriable
        );
        assert_eq!(
            FetchError::UnsupportedPair("USD/GBP".into()).retry_class(),
            RetryClass::NonRetriable
        );
    }

    #[test]
    fn test_error_display() {
        let error = FetchError::ServerError {
            status: 503,
            body: "maintenance".to_string(),
        };
        assert_eq!(format!("{}", error), "HTTP 503: maintenance");

        let error = FetchError::RateLimited {
            retry_after: Some(Duration::from_secs(3)),
        };
        assert_eq!(format!("{}", error), "Rate limited (retry after 3s)");

        let error = FetchError::RateLimited { retry_after: None };
        assert_eq!(format!("{}", error), "Rate limited");
    }
}
