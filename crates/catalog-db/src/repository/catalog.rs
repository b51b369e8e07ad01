//! # SQLite Catalog Repository
//!
//! Catalog operations against the SQLite store.
//!
//! ## Key Operations
//! - Paged and filtered grid reads (types and brands joined in)
//! - Create with Hi/Lo assigned ids
//! - Full-row update and delete by id
//!
//! ## Grid Query
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    GridRequest → SQL                                    │
//! │                                                                         │
//! │  filter { type: 2, name_contains: "hood" }                             │
//! │  sort   { price, DESC }                                                │
//! │  page   { size: 10, index: 1 }                                         │
//! │       │                                                                 │
//! │       ├──► SELECT COUNT(*) FROM catalog_items ci                       │
//! │       │    WHERE ci.catalog_type_id = ? AND ci.name LIKE ? ESCAPE '\'  │
//! │       │                                                                 │
//! │       └──► SELECT ci.*, ct.type, cb.brand                              │
//! │            FROM catalog_items ci JOIN catalog_types ... JOIN brands ... │
//! │            WHERE <same filter>                                         │
//! │            ORDER BY ci.price_cents DESC, ci.id ASC                     │
//! │            LIMIT 10 OFFSET 10                                          │
//! │                                                                         │
//! │  Sort columns come from a closed enum, never from caller text.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::sync::Arc;
use tracing::{debug, info};

use catalog_core::validation::{validate_catalog_item, validate_name_filter, validate_page};
use catalog_core::{
    CatalogBrand, CatalogFilter, CatalogItem, CatalogItemDetails, CatalogType, GridRequest,
    PaginatedItems, SortField,
};

use super::CatalogRepository;
use crate::error::{DbError, DbResult};
use crate::hilo::HiLoAllocator;

const DETAILS_SELECT: &str = r#"
    SELECT
        ci.id,
        ci.name,
        ci.description,
        ci.price_cents,
        ci.picture_file_name,
        ci.catalog_type_id,
        ci.catalog_brand_id,
        ci.available_stock,
        ci.restock_threshold,
        ci.max_stock_threshold,
        ci.on_reorder,
        ct.type AS type_name,
        cb.brand AS brand_name
    FROM catalog_items ci
    INNER JOIN catalog_types ct ON ct.id = ci.catalog_type_id
    INNER JOIN catalog_brands cb ON cb.id = ci.catalog_brand_id
"#;

/// One joined row: the item columns plus the two lookup names.
#[derive(Debug, sqlx::FromRow)]
struct CatalogItemRow {
    #[sqlx(flatten)]
    item: CatalogItem,
    type_name: String,
    brand_name: String,
}

impl From<CatalogItemRow> for CatalogItemDetails {
    fn from(row: CatalogItemRow) -> Self {
        CatalogItemDetails {
            catalog_type: CatalogType {
                id: row.item.catalog_type_id,
                name: row.type_name,
            },
            catalog_brand: CatalogBrand {
                id: row.item.catalog_brand_id,
                name: row.brand_name,
            },
            item: row.item,
        }
    }
}

/// Repository for catalog items stored in SQLite.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.catalog();
///
/// let page = repo.list_paginated(10, 0).await?;
/// let created = repo.create(CatalogItem::new("Mug", Money::from_cents(850), 1, 2)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteCatalogRepository {
    pool: SqlitePool,
    allocator: Arc<HiLoAllocator>,
}

impl SqliteCatalogRepository {
    pub fn new(pool: SqlitePool, allocator: Arc<HiLoAllocator>) -> Self {
        SqliteCatalogRepository { pool, allocator }
    }

    /// Rejects dangling type or brand references before an id is drawn.
    ///
    /// The foreign keys on `catalog_items` still back this up on insert.
    async fn check_references(&self, item: &CatalogItem) -> DbResult<()> {
        let (type_exists, brand_exists): (bool, bool) = sqlx::query_as(
            r#"
            SELECT
                EXISTS (SELECT 1 FROM catalog_types WHERE id = ?1),
                EXISTS (SELECT 1 FROM catalog_brands WHERE id = ?2)
            "#,
        )
        .bind(item.catalog_type_id)
        .bind(item.catalog_brand_id)
        .fetch_one(&self.pool)
        .await?;

        if !type_exists {
            return Err(DbError::foreign_key(format!(
                "catalog type {} does not exist",
                item.catalog_type_id
            )));
        }
        if !brand_exists {
            return Err(DbError::foreign_key(format!(
                "catalog brand {} does not exist",
                item.catalog_brand_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for SqliteCatalogRepository {
    async fn query(
        &self,
        request: &GridRequest,
    ) -> DbResult<PaginatedItems<CatalogItemDetails>> {
        validate_page(&request.page)?;
        let filter = CatalogFilter {
            name_contains: validate_name_filter(request.filter.name_contains.as_deref())?,
            ..request.filter.clone()
        };

        debug!(
            page_size = request.page.page_size,
            page_index = request.page.page_index,
            sort = request.sort.field.column(),
            filtered = !filter.is_empty(),
            "Querying catalog page"
        );

        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM catalog_items ci");
        push_filter(&mut count_query, &filter);
        let count: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let offset = i64::try_from(request.page.offset()).unwrap_or(i64::MAX);

        let mut page_query = QueryBuilder::<Sqlite>::new(DETAILS_SELECT);
        push_filter(&mut page_query, &filter);
        page_query
            .push(" ORDER BY ci.")
            .push(request.sort.field.column())
            .push(" ")
            .push(request.sort.direction.keyword());
        if request.sort.field != SortField::Id {
            page_query.push(", ci.id ASC");
        }
        page_query
            .push(" LIMIT ")
            .push_bind(i64::from(request.page.page_size))
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<CatalogItemRow> = page_query
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        debug!(count, returned = rows.len(), "Catalog page loaded");

        Ok(PaginatedItems::new(
            request.page.page_index,
            request.page.page_size,
            count,
            rows.into_iter().map(CatalogItemDetails::from).collect(),
        ))
    }

    async fn find(&self, id: i32) -> DbResult<Option<CatalogItemDetails>> {
        let row = sqlx::query_as::<_, CatalogItemRow>(&format!("{DETAILS_SELECT} WHERE ci.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CatalogItemDetails::from))
    }

    async fn list_types(&self) -> DbResult<Vec<CatalogType>> {
        let types = sqlx::query_as::<_, CatalogType>(
            "SELECT id, type AS name FROM catalog_types ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }

    async fn list_brands(&self) -> DbResult<Vec<CatalogBrand>> {
        let brands = sqlx::query_as::<_, CatalogBrand>(
            "SELECT id, brand AS name FROM catalog_brands ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(brands)
    }

    async fn create(&self, item: CatalogItem) -> DbResult<CatalogItem> {
        validate_catalog_item(&item)?;
        self.check_references(&item).await?;

        // The allocator may need its own connection for a refill, so no
        // connection is held while waiting for it.
        let id = self.allocator.next_id().await?;
        let item = item.with_id(id);

        sqlx::query(
            r#"
            INSERT INTO catalog_items (
                id, name, description, price_cents, picture_file_name,
                catalog_type_id, catalog_brand_id,
                available_stock, restock_threshold, max_stock_threshold, on_reorder
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price_cents)
        .bind(&item.picture_file_name)
        .bind(item.catalog_type_id)
        .bind(item.catalog_brand_id)
        .bind(item.available_stock)
        .bind(item.restock_threshold)
        .bind(item.max_stock_threshold)
        .bind(item.on_reorder)
        .execute(&self.pool)
        .await?;

        info!(id = item.id, name = %item.name, "Catalog item created");
        Ok(item)
    }

    async fn update(&self, item: &CatalogItem) -> DbResult<()> {
        validate_catalog_item(item)?;

        let result = sqlx::query(
            r#"
            UPDATE catalog_items SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                picture_file_name = ?5,
                catalog_type_id = ?6,
                catalog_brand_id = ?7,
                available_stock = ?8,
                restock_threshold = ?9,
                max_stock_threshold = ?10,
                on_reorder = ?11
            WHERE id = ?1
            "#,
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price_cents)
        .bind(&item.picture_file_name)
        .bind(item.catalog_type_id)
        .bind(item.catalog_brand_id)
        .bind(item.available_stock)
        .bind(item.restock_threshold)
        .bind(item.max_stock_threshold)
        .bind(item.on_reorder)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CatalogItem", item.id));
        }

        debug!(id = item.id, "Catalog item updated");
        Ok(())
    }

    async fn remove(&self, item: &CatalogItem) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM catalog_items WHERE id = ?1")
            .bind(item.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CatalogItem", item.id));
        }

        info!(id = item.id, "Catalog item removed");
        Ok(())
    }

    async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Appends the WHERE clause for `filter`, binding every value.
fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &CatalogFilter) {
    let mut separator = " WHERE ";

    if let Some(type_id) = filter.catalog_type_id {
        query
            .push(separator)
            .push("ci.catalog_type_id = ")
            .push_bind(type_id);
        separator = " AND ";
    }

    if let Some(brand_id) = filter.catalog_brand_id {
        query
            .push(separator)
            .push("ci.catalog_brand_id = ")
            .push_bind(brand_id);
        separator = " AND ";
    }

    if let Some(needle) = filter.name_contains.as_deref() {
        query
            .push(separator)
            .push("ci.name LIKE ")
            .push_bind(format!("%{}%", escape_like(needle)))
            .push(" ESCAPE '\\'");
    }
}

/// Escapes `%`, `_` and `\` so the needle matches literally inside LIKE.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// =============================================================================
// Unit Tests
// =============================================================================
