//! Product domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PRICE_CURRENCY, DEFAULT_TARGET_CURRENCY, PRODUCT_CODE_LENGTH};
use crate::fx::{CurrencyCode, CurrencyPair, ExchangeQuote};
use crate::{errors::ValidationError, Error, Result};

fn default_price_currency() -> CurrencyCode {
    DEFAULT_PRICE_CURRENCY.into()
}

fn default_target_currency() -> CurrencyCode {
    DEFAULT_TARGET_CURRENCY.into()
}

fn default_available() -> bool {
    true
}

/// Domain model representing a product in the catalogue.
///
/// `converted_price` and `last_quote` are either both present or both absent,
/// and `last_quote.pair` always equals [`Product::pair`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub price: Decimal,
    pub currency: CurrencyCode,
    pub target_currency: CurrencyCode,
    pub converted_price: Option<Decimal>,
    pub last_quote: Option<ExchangeQuote>,
    pub available: bool,
    /// Optimistic concurrency stamp. Starts at 1 and grows with every save.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Builds an unsaved product from a create command. The repository assigns
    /// the id on insert.
    pub fn from_new(new_product: NewProduct, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            code: new_product.code.trim().to_string(),
            name: new_product.name.trim().to_string(),
            price: new_product.price,
            currency: new_product.currency,
            target_currency: new_product.target_currency,
            converted_price: None,
            last_quote: None,
            available: new_product.available,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// The conversion this product's derived price is based on.
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.currency.clone(), self.target_currency.clone())
    }

    /// Re-prices the product with `quote`.
    pub fn apply_quote(&mut self, quote: ExchangeQuote) -> Result<()> {
        let pair = self.pair();
        if quote.pair != pair {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Quote for {} cannot price product {} ({})",
                quote.pair, self.code, pair
            ))));
        }
        self.converted_price = Some(converted_price(&quote, self.price)?);
        self.last_quote = Some(quote);
        Ok(())
    }

    /// Applies a partial update. A new price is converted with the stored quote.
    ///
    /// Nothing changes when the new price cannot be converted.
    pub fn apply_update(&mut self, update: ProductUpdate) -> Result<()> {
        if let Some(price) = update.price {
            self.converted_price = self
                .last_quote
                .as_ref()
                .map(|quote| converted_price(quote, price))
                .transpose()?;
            self.price = price;
        }
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(available) = update.available {
            self.available = available;
        }
        Ok(())
    }
}

fn converted_price(quote: &ExchangeQuote, price: Decimal) -> Result<Decimal> {
    quote.convert(price).ok_or_else(|| {
        Error::Validation(ValidationError::InvalidInput(format!(
            "Price {} {} is too large to convert at rate {}",
            price, quote.pair.source, quote.rate
        )))
    })
}

/// Input model for creating a new product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default = "default_price_currency")]
    pub currency: CurrencyCode,
    #[serde(default = "default_target_currency")]
    pub target_currency: CurrencyCode,
    #[serde(default = "default_available")]
    pub available: bool,
}

impl NewProduct {
    /// A product priced in EUR with a derived USD price.
    pub fn new(code: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            price,
            currency: default_price_currency(),
            target_currency: default_target_currency(),
            available: true,
        }
    }

    pub fn with_currencies(mut self, currency: CurrencyCode, target_currency: CurrencyCode) -> Self {
        self.currency = currency;
        self.target_currency = target_currency;
        self
    }

    /// Validates the new product data.
    pub fn validate(&self) -> Result<()> {
        validate_code(&self.code)?;
        validate_name(&self.name)?;
        validate_price(self.price)?;
        Ok(())
    }
}

/// Input model for a partial product update. Absent fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub available: Option<bool>,
}

impl ProductUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.available.is_none()
    }
}

/// Outcome of a batch pricing refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRefreshSummary {
    pub updated: usize,
    pub conflicts: usize,
    pub failed_products: usize,
    /// Pairs whose quote could not be fetched, as `EUR/USD` strings.
    pub failed_pairs: Vec<String>,
}

impl PricingRefreshSummary {
    /// True when every product was re-priced and saved.
    pub fn is_clean(&self) -> bool {
        self.conflicts == 0 && self.failed_products == 0 && self.failed_pairs.is_empty()
    }
}

fn validate_code(code: &str) -> Result<()> {
    let length = code.trim().chars().count();
    if length != PRODUCT_CODE_LENGTH {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Product code must be exactly {} characters, got {}",
            PRODUCT_CODE_LENGTH, length
        ))));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            "name".to_string(),
        )));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<()> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Price must not be negative, got {}",
            price
        ))));
    }
    Ok(())
}
