//! # Validation Module
//!
//! Input validation for catalog items and page requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Grid / edit form (UI)                                        │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Repository entry (Rust)                                      │
//! │  └── THIS MODULE: runs before any id is allocated or row written       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store                                                        │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign keys to catalog_types / catalog_brands                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use catalog_core::validation::{validate_catalog_item, validate_page};
//! use catalog_core::{CatalogItem, Money, PageRequest};
//!
//! let item = CatalogItem::new("Prism White T-Shirt", Money::from_cents(1200), 2, 5);
//! assert!(validate_catalog_item(&item).is_ok());
//! assert!(validate_page(&PageRequest::new(0, 0)).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{CatalogItem, PageRequest};
use crate::{MAX_PAGE_SIZE, MAX_PRICE_CENTS, MAX_STOCK_UNITS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted item name (the column is 50 characters wide).
pub const MAX_NAME_LEN: usize = 50;

/// Longest accepted picture reference.
pub const MAX_PICTURE_FILE_NAME_LEN: usize = 255;

/// Longest accepted grid name filter.
pub const MAX_NAME_FILTER_LEN: usize = 100;

// =============================================================================
// Item Validators
// =============================================================================

/// Validates an item before create or update.
///
/// ## Rules
/// - `name` non-empty, at most [`MAX_NAME_LEN`] characters
/// - `price` between 0 and 1,000,000.00
/// - `catalog_type_id` / `catalog_brand_id` set (positive)
/// - stock counts between 0 and [`MAX_STOCK_UNITS`]
/// - `picture_file_name` at most [`MAX_PICTURE_FILE_NAME_LEN`] characters
///
/// Whether the referenced type and brand exist is checked by the store.
pub fn validate_catalog_item(item: &CatalogItem) -> ValidationResult<()> {
    validate_item_name(&item.name)?;
    validate_price_cents(item.price_cents)?;
    validate_reference("catalog_type_id", item.catalog_type_id)?;
    validate_reference("catalog_brand_id", item.catalog_brand_id)?;
    validate_stock_units("available_stock", item.available_stock)?;
    validate_stock_units("restock_threshold", item.restock_threshold)?;
    validate_stock_units("max_stock_threshold", item.max_stock_threshold)?;

    if item.picture_file_name.chars().count() > MAX_PICTURE_FILE_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "picture_file_name".to_string(),
            max: MAX_PICTURE_FILE_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an item name.
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Example
/// ```rust
/// use catalog_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(1950).is_ok());
/// assert!(validate_price_cents(-1).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// A lookup reference must be set; zero means the caller left it empty.
fn validate_reference(field: &str, id: i32) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

fn validate_stock_units(field: &str, units: i32) -> ValidationResult<()> {
    if !(0..=MAX_STOCK_UNITS).contains(&units) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::from(MAX_STOCK_UNITS),
        });
    }

    Ok(())
}

// =============================================================================
// Query Validators
// =============================================================================

/// Validates a page window.
///
/// ## Rules
/// - `page_size` between 1 and [`MAX_PAGE_SIZE`]
/// - `page_index` is unsigned, so any value is a valid start; a page past
///   the end simply comes back empty
pub fn validate_page(page: &PageRequest) -> ValidationResult<()> {
    let page_size = page.page_size;

    if page_size == 0 {
        return Err(ValidationError::MustBePositive {
            field: "page_size".to_string(),
        });
    }

    if page_size > MAX_PAGE_SIZE {
        return Err(ValidationError::OutOfRange {
            field: "page_size".to_string(),
            min: 1,
            max: i64::from(MAX_PAGE_SIZE),
        });
    }

    Ok(())
}

/// Validates a grid name filter.
///
/// ## Returns
/// The trimmed filter, or `None` when it is blank.
pub fn validate_name_filter(filter: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(filter) = filter.map(str::trim) else {
        return Ok(None);
    };

    if filter.is_empty() {
        return Ok(None);
    }

    if filter.chars().count() > MAX_NAME_FILTER_LEN {
        return Err(ValidationError::TooLong {
            field: "name_contains".to_string(),
            max: MAX_NAME_FILTER_LEN,
        });
    }

    Ok(Some(filter.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Money;

    fn valid_item() -> CatalogItem {
        CatalogItem::new(".NET Blue Hoodie", Money::from_cents(1200), 2, 2)
    }

    #[test]
    fn test_valid_item_passes() {
        assert!(validate_catalog_item(&valid_item()).is_ok());
    }

    #[test]
    fn test_item_name_rules() {
        assert!(validate_item_name("Cup<T> White Mug").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name(&"A".repeat(MAX_NAME_LEN)).is_ok());
        assert!(validate_item_name(&"A".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_missing_reference_is_rejected() {
        let mut item = valid_item();
        item.catalog_brand_id = 0;

        let err = validate_catalog_item(&item).unwrap_err();
        assert_eq!(err.field(), "catalog_brand_id");
    }

    #[test]
    fn test_price_bounds() {
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_stock_bounds() {
        let mut item = valid_item();
        item.available_stock = -1;
        assert_eq!(
            validate_catalog_item(&item).unwrap_err().field(),
            "available_stock"
        );

        let mut item = valid_item();
        item.max_stock_threshold = MAX_STOCK_UNITS + 1;
        assert_eq!(
            validate_catalog_item(&item).unwrap_err().field(),
            "max_stock_threshold"
        );
    }

    #[test]
    fn test_validate_page() {
        assert!(validate_page(&PageRequest::new(10, 0)).is_ok());
        assert!(validate_page(&PageRequest::new(10, 1_000)).is_ok());
        assert!(validate_page(&PageRequest::new(MAX_PAGE_SIZE, 0)).is_ok());

        assert!(validate_page(&PageRequest::new(0, 0)).is_err());
        assert!(validate_page(&PageRequest::new(MAX_PAGE_SIZE + 1, 0)).is_err());
    }

    #[test]
    fn test_validate_name_filter() {
        assert_eq!(validate_name_filter(None).unwrap(), None);
        assert_eq!(validate_name_filter(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_name_filter(Some(" mug ")).unwrap(),
            Some("mug".to_string())
        );
        assert!(validate_name_filter(Some(&"x".repeat(101))).is_err());
    }
}
