//! # Repository Module
//!
//! Catalog access behind one trait with two backends.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Catalog Repository                                   │
//! │                                                                         │
//! │  Caller (grid, admin screen, seeder)                                   │
//! │       │                                                                 │
//! │       │  repo.list_paginated(10, 0)                                    │
//! │       ▼                                                                 │
//! │  Arc<dyn CatalogRepository>                                            │
//! │       │                                                                 │
//! │       ├──► SqliteCatalogRepository    (catalog.rs, sqlx + SQLite)      │
//! │       │                                                                 │
//! │       └──► InMemoryCatalogRepository  (memory.rs, mock data)           │
//! │                                                                         │
//! │  Both backends:                                                        │
//! │  • validate before touching the store                                 │
//! │  • take ids from a HiLoAllocator                                      │
//! │  • report NotFound / ForeignKeyViolation / StoreUnavailable alike     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SqliteCatalogRepository`](catalog::SqliteCatalogRepository) - Persistent store
//! - [`InMemoryCatalogRepository`](memory::InMemoryCatalogRepository) - Mock data store

pub mod catalog;
pub mod memory;

use async_trait::async_trait;
use catalog_core::{
    CatalogBrand, CatalogItem, CatalogItemDetails, CatalogType, GridRequest, PageRequest,
    PaginatedItems,
};

use crate::error::DbResult;

/// Catalog data access.
///
/// Implementations are shared across tasks behind an `Arc`, so every
/// method takes `&self` and must be safe to call concurrently.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Returns one page of items ordered by ascending id, with the total
    /// number of items in `count`.
    ///
    /// ## Returns
    /// * `Err(DbError::Validation)` - `page_size` is 0 or above the maximum
    async fn list_paginated(
        &self,
        page_size: u32,
        page_index: u32,
    ) -> DbResult<PaginatedItems<CatalogItemDetails>> {
        let request = GridRequest {
            page: PageRequest::new(page_size, page_index),
            ..GridRequest::default()
        };
        self.query(&request).await
    }

    /// Filtered and sorted page for the catalog grid. `count` is the number
    /// of items matching the filter.
    async fn query(&self, request: &GridRequest)
        -> DbResult<PaginatedItems<CatalogItemDetails>>;

    /// Looks up one item with its type and brand resolved.
    async fn find(&self, id: i32) -> DbResult<Option<CatalogItemDetails>>;

    /// All catalog types, ordered by id.
    async fn list_types(&self) -> DbResult<Vec<CatalogType>>;

    /// All catalog brands, ordered by id.
    async fn list_brands(&self) -> DbResult<Vec<CatalogBrand>>;

    /// Stores a new item under a freshly allocated id.
    ///
    /// The incoming `id` is ignored. The returned item carries the assigned one.
    ///
    /// ## Returns
    /// * `Err(DbError::Validation)` - Rejected before an id was allocated
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown type or brand
    /// * `Err(DbError::StoreUnavailable)` - Store or id counter unreachable
    async fn create(&self, item: CatalogItem) -> DbResult<CatalogItem>;

    /// Replaces every column of the item with the same id.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No item with that id; nothing was inserted
    async fn update(&self, item: &CatalogItem) -> DbResult<()>;

    /// Deletes the item with the same id as `item`.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No item with that id
    async fn remove(&self, item: &CatalogItem) -> DbResult<()>;

    /// Total number of items.
    async fn count(&self) -> DbResult<i64>;
}
