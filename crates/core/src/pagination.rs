//! Paging and sorting for product listings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::errors::{Result, ValidationError};

/// Product column a listing can be ordered by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductSortField {
    #[default]
    Id,
    Code,
    Name,
    Price,
}

impl FromStr for ProductSortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "code" => Ok(Self::Code),
            "name" => Ok(Self::Name),
            "price" | "priceineur" => Ok(Self::Price),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown sort field '{}'",
                other
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown sort direction '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("asc"),
            Self::Desc => f.write_str("desc"),
        }
    }
}

/// Zero-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationRequest {
    pub page: i64,
    pub size: i64,
    pub sort_by: ProductSortField,
    pub direction: SortDirection,
}

impl Default for PaginationRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort_by: ProductSortField::default(),
            direction: SortDirection::default(),
        }
    }
}

impl PaginationRequest {
    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page,
            size,
            ..Self::default()
        }
    }

    pub fn sorted(mut self, sort_by: ProductSortField, direction: SortDirection) -> Self {
        self.sort_by = sort_by;
        self.direction = direction;
        self
    }

    /// Builds a request from loosely typed query parameters.
    pub fn from_params(
        page: Option<i64>,
        size: Option<i64>,
        sort_by: Option<&str>,
        direction: Option<&str>,
    ) -> Result<Self> {
        let defaults = Self::default();
        let request = Self {
            page: page.unwrap_or(defaults.page),
            size: size.unwrap_or(defaults.size),
            sort_by: sort_by
                .map(str::parse::<ProductSortField>)
                .transpose()?
                .unwrap_or(defaults.sort_by),
            direction: direction
                .map(str::parse::<SortDirection>)
                .transpose()?
                .unwrap_or(defaults.direction),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page < 0 {
            return Err(ValidationError::InvalidInput(format!(
                "Page index must not be negative, got {}",
                self.page
            ))
            .into());
        }
        if self.size < 1 || self.size > MAX_PAGE_SIZE {
            return Err(ValidationError::InvalidInput(format!(
                "Page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.size
            ))
            .into());
        }
        Ok(())
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }
}

/// One page of results plus totals across all pages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total_elements: i64, size: i64) -> Self {
        let total_pages = if size > 0 {
            (total_elements + size - 1) / size
        } else {
            0
        };
        Self {
            items,
            total_elements,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = PaginationRequest::default();
        assert_eq!(request.page, 0);
        assert_eq!(request.size, 10);
        assert_eq!(request.sort_by, ProductSortField::Id);
        assert_eq!(request.direction, SortDirection::Asc);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_from_params_parses_sorting() {
        let request =
            PaginationRequest::from_params(Some(2), Some(25), Some("priceInEur"), Some("DESC"))
                .unwrap();
        assert_eq!(request.sort_by, ProductSortField::Price);
        assert_eq!(request.direction, SortDirection::Desc);
        assert_eq!(request.offset(), 50);
    }

    #[test]
    fn test_from_params_rejects_unknown_values() {
        assert!(PaginationRequest::from_params(None, None, Some("colour"), None).is_err());
        assert!(PaginationRequest::from_params(None, None, None, Some("up")).is_err());
        assert!(PaginationRequest::from_params(Some(-1), None, None, None).is_err());
        assert!(PaginationRequest::from_params(None, Some(0), None, None).is_err());
        assert!(PaginationRequest::from_params(None, Some(101), None, None).is_err());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let result: PaginatedResult<i32> = PaginatedResult::new(vec![], 21, 10);
        assert_eq!(result.total_pages, 3);
        let result: PaginatedResult<i32> = PaginatedResult::new(vec![], 0, 10);
        assert_eq!(result.total_pages, 0);
        let result: PaginatedResult<i32> = PaginatedResult::new(vec![], 20, 10);
        assert_eq!(result.total_pages, 2);
    }
}
