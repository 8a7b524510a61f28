use crate::fx::SupportedCurrency;

/// Required length of a product code.
pub const PRODUCT_CODE_LENGTH: usize = 10;

/// Decimal precision for derived prices
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Default base currency for new products
pub const DEFAULT_PRICE_CURRENCY: SupportedCurrency = SupportedCurrency::Eur;

/// Default target currency for the converted price
pub const DEFAULT_TARGET_CURRENCY: SupportedCurrency = SupportedCurrency::Usd;

/// Default page size for product listings
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page size a listing may request
pub const MAX_PAGE_SIZE: i64 = 100;
