//! HTTP plumbing shared by the rate sources.

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use reqwest::{Client, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::FetchError;

/// Longest response body kept in error messages.
const MAX_ERROR_BODY: usize = 256;

/// Builds the pooled HTTP client for a source. Clones share the pool.
pub(crate) fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Sends `request` and returns the fully parsed JSON body.
///
/// Non-success statuses are classified here so every source maps them the
/// same way.
pub(crate) async fn fetch_json(request: RequestBuilder) -> Result<Value, FetchError> {
    let response = request
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(&e))?;

    let status = response.status();
    debug!("Exchange service responded with {}", status);

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(FetchError::RateLimited { retry_after });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let body = truncate(&body);
        return Err(if status.is_server_error() {
            FetchError::ServerError {
                status: status.as_u16(),
                body,
            }
        } else {
            FetchError::ClientError {
                status: status.as_u16(),
                body,
            }
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(&e))?;
    serde_json::from_str(&body)
        .map_err(|e| FetchError::MalformedPayload(format!("Invalid JSON: {}", e)))
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Parses a rate from a JSON number or string.
pub(crate) fn parse_rate_value(value: &Value) -> Result<Decimal, FetchError> {
    match value {
        Value::Number(n) => parse_rate_str(&n.to_string()),
        Value::String(s) => parse_rate_str(s),
        Value::Null => Err(FetchError::MalformedPayload("rate is missing".to_string())),
        other => Err(FetchError::MalformedPayload(format!(
            "rate must be a number or string, got {}",
            other
        ))),
    }
}

/// Parses a textual rate. Accepts a decimal comma ("7,45") and scientific
/// notation ("1.5e-3").
pub(crate) fn parse_rate_str(raw: &str) -> Result<Decimal, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FetchError::MalformedPayload("rate is empty".to_string()));
    }
    if trimmed.contains(',') && trimmed.contains('.') {
        return Err(FetchError::MalformedPayload(format!(
            "ambiguous decimal separators in '{}'",
            trimmed
        )));
    }
    let normalized = trimmed.replace(',', ".");
    let parsed = if normalized.contains(|c: char| c == 'e' || c == 'E') {
        Decimal::from_scientific(&normalized)
    } else {
        Decimal::from_str(&normalized)
    };
    parsed.map_err(|e| FetchError::MalformedPayload(format!("unparseable rate '{}': {}", trimmed, e)))
}

/// Parses a remote timestamp: RFC 3339, a plain date, or unix seconds.
pub(crate) fn parse_timestamp(value: &Value) -> Result<Option<DateTime<Utc>>, FetchError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(Some)
            .ok_or_else(|| FetchError::MalformedPayload(format!("invalid unix timestamp {}", n))),
        Value::String(s) => parse_timestamp_str(s).map(Some),
        other => Err(FetchError::MalformedPayload(format!(
            "timestamp must be a string or number, got {}",
            other
        ))),
    }
}

pub(crate) fn parse_timestamp_str(raw: &str) -> Result<DateTime<Utc>, FetchError> {
    let trimmed = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| FetchError::MalformedPayload(format!("unparseable timestamp '{}'", trimmed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_rate_accepts_numbers_and_strings() {
        assert_eq!(parse_rate_value(&json!(0.92)).unwrap(), dec!(0.92));
        assert_eq!(parse_rate_value(&json!("1.0856")).unwrap(), dec!(1.0856));
        assert_eq!(parse_rate_value(&json!(2)).unwrap(), dec!(2));
    }

    #[test]
    fn test_parse_rate_accepts_decimal_comma() {
        assert_eq!(parse_rate_str("7,45").unwrap(), dec!(7.45));
        assert_eq!(parse_rate_str(" 1,085600 ").unwrap(), dec!(1.085600));
    }

    #[test]
    fn test_parse_rate_accepts_scientific_notation() {
        assert_eq!(parse_rate_str("1.5e-3").unwrap(), dec!(0.0015));
        assert_eq!(parse_rate_str("2E2").unwrap(), dec!(200));
    }

    #[test]
    fn test_parse_rate_rejects_garbage() {
        assert!(parse_rate_str("").is_err());
        assert!(parse_rate_str("abc").is_err());
        assert!(parse_rate_str("1.234,5").is_err());
        assert!(parse_rate_value(&json!(null)).is_err());
        assert!(parse_rate_value(&json!([1])).is_err());
    }

    #[test]
    fn test_parse_rate_keeps_sign_for_validator() {
        assert_eq!(parse_rate_str("-0.5").unwrap(), dec!(-0.5));
        assert_eq!(parse_rate_str("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 17, 0, 0, 0).unwrap();
        assert_eq!(
            parse_timestamp(&json!("2024-05-17T00:00:00Z")).unwrap(),
            Some(expected)
        );
        assert_eq!(parse_timestamp(&json!("2024-05-17")).unwrap(), Some(expected));
        assert_eq!(
            parse_timestamp(&json!(expected.timestamp())).unwrap(),
            Some(expected)
        );
        assert_eq!(parse_timestamp(&json!(null)).unwrap(), None);
        assert!(parse_timestamp(&json!("yesterday")).is_err());
    }

    #[test]
    fn test_truncate_long_bodies() {
        let body = "x".repeat(1000);
        assert_eq!(truncate(&body).len(), MAX_ERROR_BODY + 3);
        assert_eq!(truncate("short"), "short");
    }
}
