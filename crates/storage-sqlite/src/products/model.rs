//! Database models for products.

use chrono::{NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use productsmgmt_core::fx::{CurrencyCode, ExchangeQuote};
use productsmgmt_core::products::Product;

use crate::errors::StorageError;

fn parse_decimal(value: &str, field: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(value)
        .map_err(|e| StorageError::CorruptValue(format!("{} '{}': {}", field, value, e)))
}

fn parse_currency(value: &str, field: &str) -> Result<CurrencyCode, StorageError> {
    CurrencyCode::parse(value)
        .map_err(|e| StorageError::CorruptValue(format!("{} '{}': {}", field, value, e)))
}

/// Database model for products
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProductDB {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub price: String,
    pub currency: String,
    pub target_currency: String,
    pub converted_price: Option<String>,
    pub quote_rate: Option<String>,
    pub quote_fetched_at: Option<NaiveDateTime>,
    pub quote_source: Option<String>,
    pub available: bool,
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for inserting a product; SQLite assigns the id.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProductDB {
    pub code: String,
    pub name: String,
    pub price: String,
    pub currency: String,
    pub target_currency: String,
    pub converted_price: Option<String>,
    pub quote_rate: Option<String>,
    pub quote_fetched_at: Option<NaiveDateTime>,
    pub quote_source: Option<String>,
    pub available: bool,
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Mutable columns written by a versioned save. `code` and `created_at` never change.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::products)]
#[diesel(treat_none_as_null = true)]
pub struct ProductChangesDB {
    pub name: String,
    pub price: String,
    pub currency: String,
    pub target_currency: String,
    pub converted_price: Option<String>,
    pub quote_rate: Option<String>,
    pub quote_fetched_at: Option<NaiveDateTime>,
    pub quote_source: Option<String>,
    pub available: bool,
    pub version: i64,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<ProductDB> for Product {
    type Error = StorageError;

    fn try_from(db: ProductDB) -> Result<Self, Self::Error> {
        let currency = parse_currency(&db.currency, "currency")?;
        let target_currency = parse_currency(&db.target_currency, "target_currency")?;
        let price = parse_decimal(&db.price, "price")?;
        let converted_price = db
            .converted_price
            .as_deref()
            .map(|value| parse_decimal(value, "converted_price"))
            .transpose()?;

        let mut product = Product {
            id: db.id,
            code: db.code,
            name: db.name,
            price,
            currency,
            target_currency,
            converted_price: None,
            last_quote: None,
            available: db.available,
            version: db.version,
            created_at: Utc.from_utc_datetime(&db.created_at),
            updated_at: Utc.from_utc_datetime(&db.updated_at),
        };

        match (db.quote_rate, db.quote_fetched_at, db.quote_source, converted_price) {
            (Some(rate), Some(fetched_at), Some(source), Some(converted)) => {
                product.last_quote = Some(ExchangeQuote::new(
                    product.pair(),
                    parse_decimal(&rate, "quote_rate")?,
                    Utc.from_utc_datetime(&fetched_at),
                    source,
                ));
                product.converted_price = Some(converted);
            }
            (None, None, None, None) => {}
            _ => {
                return Err(StorageError::CorruptValue(format!(
                    "product {} has a partial quote",
                    product.id
                )))
            }
        }

        Ok(product)
    }
}

struct QuoteColumns {
    converted_price: Option<String>,
    rate: Option<String>,
    fetched_at: Option<NaiveDateTime>,
    source: Option<String>,
}

impl QuoteColumns {
    fn of(product: &Product) -> Self {
        Self {
            converted_price: product.converted_price.map(|d| d.to_string()),
            rate: product.last_quote.as_ref().map(|q| q.rate.to_string()),
            fetched_at: product.last_quote.as_ref().map(|q| q.fetched_at.naive_utc()),
            source: product.last_quote.as_ref().map(|q| q.source.clone()),
        }
    }
}

impl From<&Product> for NewProductDB {
    fn from(domain: &Product) -> Self {
        let quote = QuoteColumns::of(domain);
        Self {
            code: domain.code.clone(),
            name: domain.name.clone(),
            price: domain.price.to_string(),
            currency: domain.currency.to_string(),
            target_currency: domain.target_currency.to_string(),
            converted_price: quote.converted_price,
            quote_rate: quote.rate,
            quote_fetched_at: quote.fetched_at,
            quote_source: quote.source,
            available: domain.available,
            version: domain.version,
            created_at: domain.created_at.naive_utc(),
            updated_at: domain.updated_at.naive_utc(),
        }
    }
}

impl ProductChangesDB {
    /// Columns for `product` stamped with `version`.
    pub fn versioned(product: &Product, version: i64) -> Self {
        let quote = QuoteColumns::of(product);
        Self {
            name: product.name.clone(),
            price: product.price.to_string(),
            currency: product.currency.to_string(),
            target_currency: product.target_currency.to_string(),
            converted_price: quote.converted_price,
            quote_rate: quote.rate,
            quote_fetched_at: quote.fetched_at,
            quote_source: quote.source,
            available: product.available,
            version,
            updated_at: product.updated_at.naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use productsmgmt_core::products::NewProduct;
    use rust_decimal_macros::dec;

    fn priced_product() -> Product {
        let now = Utc::now();
        let mut product = Product::from_new(NewProduct::new("ABCDEFGHIJ", "Lamp", dec!(19.99)), now);
        product.id = 4;
        let quote = ExchangeQuote::new(product.pair(), dec!(1.085600), now, "HNB");
        product.apply_quote(quote).unwrap();
        product
    }

    fn row_for(product: &Product) -> ProductDB {
        let new_row = NewProductDB::from(product);
        ProductDB {
            id: product.id,
            code: new_row.code,
            name: new_row.name,
            price: new_row.price,
            currency: new_row.currency,
            target_currency: new_row.target_currency,
            converted_price: new_row.converted_price,
            quote_rate: new_row.quote_rate,
            quote_fetched_at: new_row.quote_fetched_at,
            quote_source: new_row.quote_source,
            available: new_row.available,
            version: new_row.version,
            created_at: new_row.created_at,
            updated_at: new_row.updated_at,
        }
    }

    #[test]
    fn test_decimals_keep_their_scale() {
        let row = row_for(&priced_product());
        assert_eq!(row.price, "19.99");
        assert_eq!(row.quote_rate.as_deref(), Some("1.085600"));
        assert_eq!(row.converted_price.as_deref(), Some("21.70"));
    }

    #[test]
    fn test_row_converts_back_to_product() {
        let product = priced_product();
        let back = Product::try_from(row_for(&product)).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn test_unpriced_row_has_no_quote() {
        let mut product = priced_product();
        product.converted_price = None;
        product.last_quote = None;
        let back = Product::try_from(row_for(&product)).unwrap();
        assert!(back.last_quote.is_none());
        assert!(back.converted_price.is_none());
    }

    #[test]
    fn test_partial_quote_is_corrupt() {
        let mut row = row_for(&priced_product());
        row.quote_source = None;
        assert!(matches!(
            Product::try_from(row),
            Err(StorageError::CorruptValue(_))
        ));
    }

    #[test]
    fn test_bad_decimal_is_corrupt() {
        let mut row = row_for(&priced_product());
        row.price = "abc".to_string();
        assert!(matches!(
            Product::try_from(row),
            Err(StorageError::CorruptValue(_))
        ));
    }
}
