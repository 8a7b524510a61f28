use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

/// An ISO-4217 style currency code: exactly three ASCII letters, upper case.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses a code, trimming whitespace and normalising to upper case.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrencyCode(raw.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl From<SupportedCurrency> for CurrencyCode {
    fn from(currency: SupportedCurrency) -> Self {
        Self(currency.code().to_string())
    }
}

/// Currencies offered out of the box. Any well-formed code is still accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SupportedCurrency {
    Eur,
    Usd,
    Gbp,
}

impl SupportedCurrency {
    pub const ALL: [SupportedCurrency; 3] = [Self::Eur, Self::Usd, Self::Gbp];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Eur => "EUR",
            Self::Usd => "USD",
            Self::Gbp => "GBP",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Eur => "Euro",
            Self::Usd => "US Dollar",
            Self::Gbp => "British Pound",
        }
    }

    pub fn from_code(code: &CurrencyCode) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code.as_str())
    }
}

/// A directed conversion from `source` into `target`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub source: CurrencyCode,
    pub target: CurrencyCode,
}

impl CurrencyPair {
    pub fn new(source: CurrencyCode, target: CurrencyCode) -> Self {
        Self { source, target }
    }

    /// Builds a pair from raw strings, validating both codes.
    pub fn parse(source: &str, target: &str) -> Result<Self, ValidationError> {
        Ok(Self::new(
            CurrencyCode::parse(source)?,
            CurrencyCode::parse(target)?,
        ))
    }

    pub fn is_identity(&self) -> bool {
        self.source == self.target
    }

    pub fn inverse(&self) -> Self {
        Self::new(self.target.clone(), self.source.clone())
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let code = CurrencyCode::parse(" usd ").unwrap();
        assert_eq!(code.as_str(), "USD");
    }

    #[test]
    fn test_parse_rejects_malformed_codes() {
        for raw in ["", "US", "USDX", "U$D", "12A", "€UR"] {
            assert!(
                CurrencyCode::parse(raw).is_err(),
                "expected '{}' to be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_pair_display_and_identity() {
        let pair = CurrencyPair::parse("eur", "USD").unwrap();
        assert_eq!(pair.to_string(), "EUR/USD");
        assert!(!pair.is_identity());
        assert_eq!(pair.inverse().to_string(), "USD/EUR");
        assert!(CurrencyPair::parse("GBP", "gbp").unwrap().is_identity());
    }

    #[test]
    fn test_supported_currency_lookup() {
        let gbp = CurrencyCode::from(SupportedCurrency::Gbp);
        assert_eq!(SupportedCurrency::from_code(&gbp), Some(SupportedCurrency::Gbp));
        assert_eq!(
            SupportedCurrency::from_code(&CurrencyCode::parse("CHF").unwrap()),
            None
        );
    }

    #[test]
    fn test_serde_rejects_invalid_code() {
        let parsed: Result<CurrencyCode, _> = serde_json::from_str("\"EURO\"");
        assert!(parsed.is_err());
        let parsed: CurrencyCode = serde_json::from_str("\"chf\"").unwrap();
        assert_eq!(parsed.as_str(), "CHF");
    }
}
