//! # Domain Types
//!
//! Core domain types used throughout the catalog store.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogItem    │   │  CatalogType    │   │  CatalogBrand   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (Hi/Lo)     │──►│  id             │   │  id             │       │
//! │  │  name, price    │   │  name           │   │  name           │       │
//! │  │  type_id (FK)   │   └─────────────────┘   └─────────────────┘       │
//! │  │  brand_id (FK) ─┼──────────────────────────────────▲                │
//! │  │  stock counts   │                                                    │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  CatalogItemDetails = CatalogItem + its CatalogType + its CatalogBrand │
//! │  PaginatedItems<T>  = one page + total count                           │
//! │  GridRequest        = page + filter + sort (grid component queries)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use ts_rs::TS;

use crate::money::Money;
use crate::{DEFAULT_PAGE_SIZE, DEFAULT_PICTURE_FILE_NAME};

// =============================================================================
// Lookup Tables
// =============================================================================

/// A catalog item type (Mug, T-Shirt, ...). Static lookup set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CatalogType {
    pub id: i32,
    pub name: String,
}

/// A catalog brand. Static lookup set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CatalogBrand {
    pub id: i32,
    pub name: String,
}

// =============================================================================
// Catalog Item
// =============================================================================

/// A catalog item as stored: scalar columns plus the two lookup references.
///
/// `id` is ignored on create; the store assigns it from the Hi/Lo allocator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CatalogItem {
    /// Allocator-assigned identifier (0 until created).
    pub id: i32,

    /// Display name, at most 50 characters.
    pub name: String,

    pub description: Option<String>,

    /// Price in cents.
    pub price_cents: i64,

    /// Image reference served by the UI layer.
    pub picture_file_name: String,

    /// References an existing [`CatalogType`].
    pub catalog_type_id: i32,

    /// References an existing [`CatalogBrand`].
    pub catalog_brand_id: i32,

    /// Quantity in stock.
    pub available_stock: i32,

    /// Available stock at which we should reorder.
    pub restock_threshold: i32,

    /// Maximum number of units that can be in stock at any time.
    pub max_stock_threshold: i32,

    /// True if the item is on reorder.
    pub on_reorder: bool,
}

impl CatalogItem {
    /// Creates an unsaved item with the default picture and zeroed stock.
    ///
    /// ## Example
    /// ```rust
    /// use catalog_core::{CatalogItem, Money};
    ///
    /// let item = CatalogItem::new(".NET Bot Black Hoodie", Money::from_cents(1950), 2, 2);
    /// assert_eq!(item.id, 0);
    /// assert_eq!(item.picture_file_name, "dummy.png");
    /// ```
    pub fn new(
        name: impl Into<String>,
        price: Money,
        catalog_type_id: i32,
        catalog_brand_id: i32,
    ) -> Self {
        CatalogItem {
            id: 0,
            name: name.into(),
            description: None,
            price_cents: price.cents(),
            picture_file_name: DEFAULT_PICTURE_FILE_NAME.to_string(),
            catalog_type_id,
            catalog_brand_id,
            available_stock: 0,
            restock_threshold: 0,
            max_stock_threshold: 0,
            on_reorder: false,
        }
    }

    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns a copy carrying the given identifier.
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }
}

/// A catalog item with its type and brand resolved.
///
/// Every read (`find`, paging, grid queries) returns this shape so callers
/// never see a dangling lookup reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogItemDetails {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub catalog_type: CatalogType,
    pub catalog_brand: CatalogBrand,
}

impl CatalogItemDetails {
    #[inline]
    pub fn id(&self) -> i32 {
        self.item.id
    }
}

// =============================================================================
// Paging
// =============================================================================

/// One page of an ordered collection plus the total count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct PaginatedItems<T> {
    pub page_index: u32,
    pub page_size: u32,
    /// Total items matching the query, independent of the page window.
    pub count: i64,
    pub data: Vec<T>,
}

impl<T> PaginatedItems<T> {
    pub fn new(page_index: u32, page_size: u32, count: i64, data: Vec<T>) -> Self {
        PaginatedItems {
            page_index,
            page_size,
            count,
            data,
        }
    }

    /// Number of pages needed to show `count` items.
    pub fn total_pages(&self) -> i64 {
        if self.page_size == 0 {
            return 0;
        }
        let size = i64::from(self.page_size);
        (self.count + size - 1) / size
    }
}

/// A page window: `page_size` items starting at `page_index * page_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageRequest {
    pub page_size: u32,
    pub page_index: u32,
}

impl PageRequest {
    pub const fn new(page_size: u32, page_index: u32) -> Self {
        PageRequest {
            page_size,
            page_index,
        }
    }

    /// Number of rows skipped before this page.
    #[inline]
    pub fn offset(&self) -> u64 {
        u64::from(self.page_size) * u64::from(self.page_index)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(DEFAULT_PAGE_SIZE, 0)
    }
}

// =============================================================================
// Grid Queries
// =============================================================================

/// Column the grid sorts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Id,
    Name,
    Price,
    AvailableStock,
}

impl SortField {
    /// Column name in the `catalog_items` table.
    pub const fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Price => "price_cents",
            SortField::AvailableStock => "available_stock",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub const fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Sort order for a grid request. Ties are always broken by ascending id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        SortSpec { field, direction }
    }

    /// Orders two items the way the SQL backend's `ORDER BY` does.
    pub fn compare(&self, a: &CatalogItem, b: &CatalogItem) -> Ordering {
        let primary = match self.field {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Name => a.name.cmp(&b.name),
            SortField::Price => a.price_cents.cmp(&b.price_cents),
            SortField::AvailableStock => a.available_stock.cmp(&b.available_stock),
        };
        let primary = match self.direction {
            SortDirection::Ascending => primary,
            SortDirection::Descending => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Row filter for a grid request. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogFilter {
    pub catalog_type_id: Option<i32>,
    pub catalog_brand_id: Option<i32>,
    /// Case-insensitive substring of the item name.
    pub name_contains: Option<String>,
}

impl CatalogFilter {
    /// True if the item passes every set criterion.
    ///
    /// Name matching folds ASCII case only, like SQLite's `LIKE`.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        if let Some(type_id) = self.catalog_type_id {
            if item.catalog_type_id != type_id {
                return false;
            }
        }
        if let Some(brand_id) = self.catalog_brand_id {
            if item.catalog_brand_id != brand_id {
                return false;
            }
        }
        match self.name_contains.as_deref() {
            Some(needle) if !needle.is_empty() => item
                .name
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase()),
            _ => true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.catalog_type_id.is_none()
            && self.catalog_brand_id.is_none()
            && self.name_contains.as_deref().map_or(true, str::is_empty)
    }
}

/// What the catalog grid asks for: a page, an optional filter and a sort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GridRequest {
    pub page: PageRequest,
    #[serde(default)]
    pub filter: CatalogFilter,
    #[serde(default)]
    pub sort: SortSpec,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i32, name: &str, price_cents: i64, stock: i32) -> CatalogItem {
        let mut item = CatalogItem::new(name, Money::from_cents(price_cents), 1, 1).with_id(id);
        item.available_stock = stock;
        item
    }

    #[test]
    fn test_new_item_defaults() {
        let item = CatalogItem::new("Mug", Money::from_cents(850), 1, 2);
        assert_eq!(item.id, 0);
        assert_eq!(item.price().cents(), 850);
        assert_eq!(item.picture_file_name, DEFAULT_PICTURE_FILE_NAME);
        assert!(!item.on_reorder);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(PageRequest::new(10, 0).offset(), 0);
        assert_eq!(PageRequest::new(10, 2).offset(), 20);
        assert_eq!(PageRequest::default().page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_total_pages() {
        let page: PaginatedItems<i32> = PaginatedItems::new(0, 10, 25, vec![]);
        assert_eq!(page.total_pages(), 3);

        let page: PaginatedItems<i32> = PaginatedItems::new(0, 10, 0, vec![]);
        assert_eq!(page.total_pages(), 0);
    }

    #[test]
    fn test_sort_breaks_ties_by_id() {
        let a = item(2, "Mug", 850, 5);
        let b = item(1, "Mug", 850, 5);

        let by_price = SortSpec::new(SortField::Price, SortDirection::Descending);
        assert_eq!(by_price.compare(&a, &b), Ordering::Greater);
        assert_eq!(by_price.compare(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_sort_descending() {
        let cheap = item(1, "A", 100, 0);
        let pricey = item(2, "B", 900, 0);

        let spec = SortSpec::new(SortField::Price, SortDirection::Descending);
        let mut items = vec![cheap.clone(), pricey.clone()];
        items.sort_by(|x, y| spec.compare(x, y));
        assert_eq!(items[0].id, 2);
    }

    #[test]
    fn test_filter_matches() {
        let mut hoodie = item(1, ".NET Bot Black Hoodie", 1950, 0);
        hoodie.catalog_type_id = 2;

        let filter = CatalogFilter {
            name_contains: Some("hoodie".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&hoodie));

        let filter = CatalogFilter {
            catalog_type_id: Some(1),
            ..Default::default()
        };
        assert!(!filter.matches(&hoodie));

        assert!(CatalogFilter::default().matches(&hoodie));
        assert!(CatalogFilter::default().is_empty());
    }

    #[test]
    fn test_details_serialize_flat() {
        let details = CatalogItemDetails {
            item: item(7, "Roslyn Red T-Shirt", 1200, 3),
            catalog_type: CatalogType {
                id: 1,
                name: "T-Shirt".to_string(),
            },
            catalog_brand: CatalogBrand {
                id: 1,
                name: "Other".to_string(),
            },
        };

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["catalog_type"]["name"], "T-Shirt");
    }
}
