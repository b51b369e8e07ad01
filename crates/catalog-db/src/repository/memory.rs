//! # In-Memory Catalog Repository
//!
//! Mock-data backend selected by `use_mock_data = true`. It keeps the
//! catalog in ordered maps and behaves like the SQLite backend: same
//! validation, same Hi/Lo ids, same error variants.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use catalog_core::validation::{validate_catalog_item, validate_name_filter, validate_page};
use catalog_core::{
    CatalogBrand, CatalogFilter, CatalogItem, CatalogItemDetails, CatalogType, GridRequest,
    PaginatedItems,
};

use super::CatalogRepository;
use crate::error::{DbError, DbResult};
use crate::hilo::{HiLoAllocator, InMemorySequence};
use crate::seed;

#[derive(Debug, Default)]
struct CatalogTables {
    types: BTreeMap<i32, CatalogType>,
    brands: BTreeMap<i32, CatalogBrand>,
    items: BTreeMap<i32, CatalogItem>,
}

impl CatalogTables {
    fn details(&self, item: &CatalogItem) -> DbResult<CatalogItemDetails> {
        let catalog_type = self.types.get(&item.catalog_type_id).ok_or_else(|| {
            DbError::Internal(format!(
                "Item {} references missing type {}",
                item.id, item.catalog_type_id
            ))
        })?;
        let catalog_brand = self.brands.get(&item.catalog_brand_id).ok_or_else(|| {
            DbError::Internal(format!(
                "Item {} references missing brand {}",
                item.id, item.catalog_brand_id
            ))
        })?;

        Ok(CatalogItemDetails {
            item: item.clone(),
            catalog_type: catalog_type.clone(),
            catalog_brand: catalog_brand.clone(),
        })
    }

    fn check_references(&self, item: &CatalogItem) -> DbResult<()> {
        if !self.types.contains_key(&item.catalog_type_id) {
            return Err(DbError::foreign_key(format!(
                "catalog type {} does not exist",
                item.catalog_type_id
            )));
        }
        if !self.brands.contains_key(&item.catalog_brand_id) {
            return Err(DbError::foreign_key(format!(
                "catalog brand {} does not exist",
                item.catalog_brand_id
            )));
        }
        Ok(())
    }
}

/// Catalog held in process memory.
///
/// ## Usage
/// ```rust,ignore
/// let repo = InMemoryCatalogRepository::preconfigured(10).await?;
/// let page = repo.list_paginated(10, 0).await?;
/// ```
#[derive(Debug)]
pub struct InMemoryCatalogRepository {
    tables: RwLock<CatalogTables>,
    allocator: Arc<HiLoAllocator>,
}

impl InMemoryCatalogRepository {
    /// Empty catalog over the given lookup sets.
    pub fn new(
        types: Vec<CatalogType>,
        brands: Vec<CatalogBrand>,
        allocator: Arc<HiLoAllocator>,
    ) -> Self {
        let tables = CatalogTables {
            types: types.into_iter().map(|t| (t.id, t)).collect(),
            brands: brands.into_iter().map(|b| (b.id, b)).collect(),
            items: BTreeMap::new(),
        };

        InMemoryCatalogRepository {
            tables: RwLock::new(tables),
            allocator,
        }
    }

    /// Empty catalog with the standard types and brands and a private
    /// counter starting at 1.
    pub fn with_lookups(block_size: u32) -> DbResult<Self> {
        let allocator = HiLoAllocator::new(Arc::new(InMemorySequence::default()), block_size)?;

        Ok(InMemoryCatalogRepository::new(
            seed::catalog_types(),
            seed::catalog_brands(),
            Arc::new(allocator),
        ))
    }

    /// Standard lookups plus the twelve preconfigured items.
    pub async fn preconfigured(block_size: u32) -> DbResult<Self> {
        let repo = InMemoryCatalogRepository::with_lookups(block_size)?;
        let created = seed::seed_items(&repo, seed::catalog_items()).await?;

        info!(items = created.len(), "In-memory catalog loaded");
        Ok(repo)
    }

    pub fn allocator(&self) -> &Arc<HiLoAllocator> {
        &self.allocator
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn query(
        &self,
        request: &GridRequest,
    ) -> DbResult<PaginatedItems<CatalogItemDetails>> {
        validate_page(&request.page)?;
        let filter = CatalogFilter {
            name_contains: validate_name_filter(request.filter.name_contains.as_deref())?,
            ..request.filter.clone()
        };

        let tables = self.tables.read().await;

        let mut matching: Vec<&CatalogItem> = tables
            .items
            .values()
            .filter(|item| filter.matches(item))
            .collect();
        matching.sort_by(|a, b| request.sort.compare(a, b));

        let count = matching.len() as i64;
        let offset = usize::try_from(request.page.offset()).unwrap_or(usize::MAX);

        let data = matching
            .into_iter()
            .skip(offset)
            .take(request.page.page_size as usize)
            .map(|item| tables.details(item))
            .collect::<DbResult<Vec<_>>>()?;

        debug!(count, returned = data.len(), "In-memory catalog page loaded");

        Ok(PaginatedItems::new(
            request.page.page_index,
            request.page.page_size,
            count,
            data,
        ))
    }

    async fn find(&self, id: i32) -> DbResult<Option<CatalogItemDetails>> {
        let tables = self.tables.read().await;
        tables
            .items
            .get(&id)
            .map(|item| tables.details(item))
            .transpose()
    }

    async fn list_types(&self) -> DbResult<Vec<CatalogType>> {
        Ok(self.tables.read().await.types.values().cloned().collect())
    }

    async fn list_brands(&self) -> DbResult<Vec<CatalogBrand>> {
        Ok(self.tables.read().await.brands.values().cloned().collect())
    }

    async fn create(&self, item: CatalogItem) -> DbResult<CatalogItem> {
        validate_catalog_item(&item)?;
        self.tables.read().await.check_references(&item)?;

        let id = self.allocator.next_id().await?;
        let item = item.with_id(id);

        let mut tables = self.tables.write().await;
        tables.check_references(&item)?;
        if tables.items.contains_key(&item.id) {
            return Err(DbError::UniqueViolation {
                field: "catalog_items.id".to_string(),
                value: item.id.to_string(),
            });
        }
        tables.items.insert(item.id, item.clone());

        info!(id = item.id, name = %item.name, "Catalog item created");
        Ok(item)
    }

    async fn update(&self, item: &CatalogItem) -> DbResult<()> {
        validate_catalog_item(item)?;

        let mut tables = self.tables.write().await;
        if !tables.items.contains_key(&item.id) {
            return Err(DbError::not_found("CatalogItem", item.id));
        }
        tables.check_references(item)?;
        tables.items.insert(item.id, item.clone());

        debug!(id = item.id, "Catalog item updated");
        Ok(())
    }

    async fn remove(&self, item: &CatalogItem) -> DbResult<()> {
        let mut tables = self.tables.write().await;
        if tables.items.remove(&item.id).is_none() {
            return Err(DbError::not_found("CatalogItem", item.id));
        }

        info!(id = item.id, "Catalog item removed");
        Ok(())
    }

    async fn count(&self) -> DbResult<i64> {
        Ok(self.tables.read().await.items.len() as i64)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{Money, SortDirection, SortField, SortSpec};

    #[tokio::test]
    async fn test_preconfigured_catalog() {
        let repo = InMemoryCatalogRepository::preconfigured(10).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 12);
        let first = repo.find(1).await.unwrap().unwrap();
        assert_eq!(first.item.name, ".NET Bot Black Hoodie");
        assert_eq!(first.item.picture_file_name, "1.png");
        assert_eq!(first.catalog_type.name, "T-Shirt");
        assert_eq!(first.catalog_brand.name, ".NET");
    }

    #[tokio::test]
    async fn test_next_create_follows_seeded_ids() {
        let repo = InMemoryCatalogRepository::preconfigured(5).await.unwrap();

        let created = repo
            .create(CatalogItem::new("New Mug", Money::from_cents(900), 1, 1))
            .await
            .unwrap();
        assert_eq!(created.id, 13);
    }

    #[tokio::test]
    async fn test_paging_matches_sqlite_shape() {
        let repo = InMemoryCatalogRepository::preconfigured(10).await.unwrap();

        let page = repo.list_paginated(5, 2).await.unwrap();
        assert_eq!(page.count, 12);
        assert_eq!(page.page_index, 2);
        assert_eq!(page.page_size, 5);
        let ids: Vec<i32> = page.data.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec![11, 12]);
        assert_eq!(page.total_pages(), 3);
    }

    #[tokio::test]
    async fn test_unknown_type_rejected() {
        let repo = InMemoryCatalogRepository::with_lookups(10).unwrap();

        let err = repo
            .create(CatalogItem::new("Orphan", Money::from_cents(100), 42, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(repo.count().await.unwrap(), 0);
        assert_eq!(repo.allocator().refill_count(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = InMemoryCatalogRepository::preconfigured(10).await.unwrap();

        let ghost = CatalogItem::new("Ghost", Money::from_cents(100), 1, 1).with_id(500);
        let err = repo.update(&ghost).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(repo.count().await.unwrap(), 12);
    }

    #[tokio::test]
    async fn test_sort_by_name_descending() {
        let repo = InMemoryCatalogRepository::preconfigured(10).await.unwrap();

        let request = GridRequest {
            sort: SortSpec::new(SortField::Name, SortDirection::Descending),
            ..GridRequest::default()
        };
        let page = repo.query(&request).await.unwrap();
        assert_eq!(page.data[0].item.name, "Roslyn Red T-Shirt");
    }

    #[tokio::test]
    async fn test_name_filter_too_long() {
        let repo = InMemoryCatalogRepository::with_lookups(10).unwrap();

        let request = GridRequest {
            filter: CatalogFilter {
                name_contains: Some("x".repeat(101)),
                ..CatalogFilter::default()
            },
            ..GridRequest::default()
        };
        let err = repo.query(&request).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }
}
