//! Croatian National Bank (HNB) exchange-rate list.
//!
//! `GET {base_url}{uri_path}{CODE}` returns a JSON array with the euro rate of
//! `CODE`. HNB only publishes rates against the euro, so a pair must have EUR
//! on one side:
//! - `EUR -> X` uses the mid rate as published
//! - `X -> EUR` uses the inverted mid rate

mod models;

use async_trait::async_trait;
use log::{debug, warn};
use productsmgmt_core::fx::{CurrencyCode, CurrencyPair};
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::Duration;

use super::http::{build_client, fetch_json, parse_rate_str, parse_timestamp_str};
use crate::errors::FetchError;
use crate::provider::{RateSource, RawRate};
use models::HnbRateDto;

/// Provider ID constant
const PROVIDER_ID: &str = "HNB";

/// Public HNB API host
pub const DEFAULT_BASE_URL: &str = "https://api.hnb.hr";

/// Rate list endpoint; the currency code is appended
pub const DEFAULT_URI_PATH: &str = "/tecajn-eur/v3?valuta=";

const BASE_CURRENCY: &str = "EUR";

pub struct HnbRateSource {
    client: Client,
    base_url: String,
    uri_path: String,
}

impl HnbRateSource {
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

    fn url_for(&self, code: &CurrencyCode) -> String {
        format!("{}{}{}", self.base_url, self.uri_path, code)
    }
}

/// Which currency to look up, and whether the published rate must be inverted.
fn lookup_for(pair: &CurrencyPair) -> Result<(CurrencyCode, bool), FetchError> {
    if pair.source.as_str() == BASE_CURRENCY {
        Ok((pair.target.clone(), false))
    } else if pair.target.as_str() == BASE_CURRENCY {
        Ok((pair.source.clone(), true))
    } else {
        Err(FetchError::UnsupportedPair(format!(
            "{} (HNB only quotes against {})",
            pair, BASE_CURRENCY
        )))
    }
}

fn tagged_as(row: &HnbRateDto, code: &CurrencyCode) -> bool {
    row.valuta
        .as_deref()
        .map(|v| v.trim().eq_ignore_ascii_case(code.as_str()))
        .unwrap_or(false)
}

/// Picks the row for `code` and turns it into a rate for the requested direction.
fn rate_from_rows(
    rows: Vec<HnbRateDto>,
    code: &CurrencyCode,
    invert: bool,
) -> Result<RawRate, FetchError> {
    if rows.is_empty() {
        return Err(FetchError::UnsupportedPair(format!(
            "no exchange rate published for {}",
            code
        )));
    }

    let row = match rows.iter().find(|r| tagged_as(r, code)) {
        Some(row) => row,
        None => match rows.first() {
            Some(first) if first.valuta.is_none() => {
                warn!("HNB response has no row tagged {}, using the untagged first row", code);
                first
            }
            Some(first) => {
                return Err(FetchError::MalformedPayload(format!(
                    "HNB returned a rate for {} when {} was requested",
                    first.valuta.as_deref().unwrap_or_default().trim(),
                    code
                )));
            }
            None => return Err(FetchError::MalformedPayload("empty rate list".to_string())),
        },
    };

    let mid = parse_rate_str(&row.srednji_tecaj)?;
    let rate = if invert {
        if mid <= Decimal::ZERO {
            return Err(FetchError::InvalidRate(format!(
                "cannot invert non-positive mid rate {}",
                mid
            )));
        }
        Decimal::ONE / mid
    } else {
        mid
    };

    let timestamp = row
        .datum_primjene
        .as_deref()
        .map(parse_timestamp_str)
        .transpose()?;

    Ok(RawRate { rate, timestamp })
}

#[async_trait]
impl RateSource for HnbRateSource {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_rate(&self, pair: &CurrencyPair) -> Result<RawRate, FetchError> {
        let (code, invert) = lookup_for(pair)?;
        let url = self.url_for(&code);
        debug!("HNB request: {} for {}", url, pair);

        let body = fetch_json(self.client.get(&url)).await?;
        let rows: Vec<HnbRateDto> = serde_json::from_value(body)
            .map_err(|e| FetchError::MalformedPayload(format!("unexpected HNB body: {}", e)))?;
        rate_from_rows(rows, &code, invert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn rows(value: serde_json::Value) -> Vec<HnbRateDto> {
        serde_json::from_value(value).unwrap()
    }

    fn code(raw: &str) -> CurrencyCode {
        CurrencyCode::parse(raw).unwrap()
    }

    #[test]
    fn test_lookup_direction() {
        let (c, invert) = lookup_for(&CurrencyPair::parse("EUR", "USD").unwrap()).unwrap();
        assert_eq!(c.as_str(), "USD");
        assert!(!invert);

        let (c, invert) = lookup_for(&CurrencyPair::parse("GBP", "EUR").unwrap()).unwrap();
        assert_eq!(c.as_str(), "GBP");
        assert!(invert);
    }

    #[test]
    fn test_cross_pairs_are_unsupported() {
        let err = lookup_for(&CurrencyPair::parse("USD", "GBP").unwrap()).unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedPair(_)));
    }

    #[test]
    fn test_mid_rate_with_decimal_comma() {
        let raw = rate_from_rows(
            rows(json!([{
                "broj_tecajnice": "93",
                "datum_primjene": "2024-05-17",
                "drzava": "SAD",
                "kupovni_tecaj": "1,087200",
                "prodajni_tecaj": "1,083900",
                "srednji_tecaj": "1,085600",
                "valuta": "USD"
            }])),
            &code("USD"),
            false,
        )
        .unwrap();
        assert_eq!(raw.rate, dec!(1.085600));
        assert_eq!(
            raw.timestamp.map(|t| t.date_naive().to_string()),
            Some("2024-05-17".to_string())
        );
    }

    #[test]
    fn test_inverted_rate() {
        let raw = rate_from_rows(
            rows(json!([{"valuta": "USD", "srednji_tecaj": "1,25"}])),
            &code("USD"),
            true,
        )
        .unwrap();
        assert_eq!(raw.rate, dec!(0.8));
    }

    #[test]
    fn test_picks_row_for_requested_currency() {
        let raw = rate_from_rows(
            rows(json!([
                {"valuta": "GBP", "srednji_tecaj": "0,85"},
                {"valuta": "USD", "srednji_tecaj": "1,08"}
            ])),
            &code("USD"),
            false,
        )
        .unwrap();
        assert_eq!(raw.rate, dec!(1.08));
    }

    #[test]
    fn test_row_for_other_currency_is_malformed() {
        let err = rate_from_rows(
            rows(json!([{"valuta": "GBP", "srednji_tecaj": "0,850000"}])),
            &code("USD"),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, FetchError::MalformedPayload(ref m) if m.contains("GBP")));
        assert_eq!(err.retry_class(), crate::errors::RetryClass::NonRetriable);
    }

    #[test]
    fn test_untagged_single_row_is_accepted() {
        let raw = rate_from_rows(
            rows(json!([{"srednji_tecaj": "1,085600"}])),
            &code("USD"),
            false,
        )
        .unwrap();
        assert_eq!(raw.rate, dec!(1.085600));
    }

    #[test]
    fn test_empty_list_is_unsupported() {
        let err = rate_from_rows(Vec::new(), &code("XYZ"), false).unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedPair(_)));
    }

    #[test]
    fn test_zero_mid_rate_cannot_be_inverted() {
        let err = rate_from_rows(
            rows(json!([{"valuta": "USD", "srednji_tecaj": "0,000"}])),
            &code("USD"),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, FetchError::InvalidRate(_)));
    }

    #[test]
    fn test_url_appends_code() {
        let source = HnbRateSource::new(DEFAULT_BASE_URL, DEFAULT_URI_PATH, Duration::from_secs(1));
        assert_eq!(
            source.url_for(&code("USD")),
            "https://api.hnb.hr/tecajn-eur/v3?valuta=USD"
        );
    }
}
