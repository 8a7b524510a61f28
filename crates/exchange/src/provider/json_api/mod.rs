//! Generic JSON rate API.
//!
//! Queries `GET {base_url}{uri_path}?from=EUR&to=USD` and expects a body of
//! the form:
//!
//! ```json
//! { "rate": 1.0856, "timestamp": "2024-05-17T10:00:00Z", "source": "EUR", "target": "USD" }
//! ```
//!
//! `rate` may be a number or a string. `timestamp` (RFC 3339 or unix seconds),
//! `source` and `target` are optional; when the codes are echoed they must
//! match the request.

use async_trait::async_trait;
use log::debug;
use productsmgmt_core::fx::CurrencyPair;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::http::{build_client, fetch_json, parse_rate_value, parse_timestamp};
use crate::errors::FetchError;
use crate::provider::{RateSource, RawRate};

/// Provider ID constant
const PROVIDER_ID: &str = "JSON_API";

/// Default path appended to the base URL
pub const DEFAULT_URI_PATH: &str = "/rates";

#[derive(Debug, Deserialize)]
struct RateResponse {
    #[serde(default)]
    rate: Value,
    #[serde(default)]
    timestamp: Value,
    source: Option<String>,
    target: Option<String>,
}

pub struct JsonApiRateSource {
    client: Client,
    base_url: String,
    uri_path: String,
}

impl JsonApiRateSource {
    pub fn new(base_url: impl Into<String>, uri_path: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(build_client(timeout), base_url, uri_path)
    }

    /// Reuses an existing client and its connection pool.
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        uri_path: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            uri_path: uri_path.into(),
        }
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url, self.uri_path)
    }
}

/// Maps a parsed body to a raw rate for `pair`.
fn map_response(pair: &CurrencyPair, body: Value) -> Result<RawRate, FetchError> {
    let response: RateResponse = serde_json::from_value(body)
        .map_err(|e| FetchError::MalformedPayload(format!("unexpected body: {}", e)))?;

    check_echo("source", response.source.as_deref(), pair.source.as_str())?;
    check_echo("target", response.target.as_deref(), pair.target.as_str())?;

    Ok(RawRate {
        rate: parse_rate_value(&response.rate)?,
        timestamp: parse_timestamp(&response.timestamp)?,
    })
}

fn check_echo(field: &str, echoed: Option<&str>, requested: &str) -> Result<(), FetchError> {
    match echoed {
        Some(code) if !code.trim().eq_ignore_ascii_case(requested) => {
            Err(FetchError::MalformedPayload(format!(
                "response {} '{}' does not match requested '{}'",
                field, code, requested
            )))
        }
        _ => Ok(()),
    }
}

#[async_trait]
impl RateSource for JsonApiRateSource {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_rate(&self, pair: &CurrencyPair) -> Result<RawRate, FetchError> {
        let url = self.url();
        debug!("JSON rate request: {} for {}", url, pair);

        let request = self.client.get(&url).query(&[
            ("from", pair.source.as_str()),
            ("to", pair.target.as_str()),
        ]);
        let body = fetch_json(request).await?;
        map_response(pair, body)
    }
}
