//! # Preconfigured Catalog Data
//!
//! The fixed type and brand sets plus the twelve sample items used by the
//! mock backend and by first-start seeding of an empty SQLite store.
//!
//! Items go through [`CatalogRepository::create`], so seeded ids come from
//! the Hi/Lo counter like any other id and later creates never collide.

use catalog_core::{CatalogBrand, CatalogItem, CatalogType, Money};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::CatalogRepository;

const STOCK_UNITS: i32 = 100;

/// (name, type id, brand id, price in cents)
const ITEMS: &[(&str, i32, i32, i64)] = &[
    (".NET Bot Black Hoodie", 2, 2, 1950),
    (".NET Black & White Mug", 1, 2, 850),
    ("Prism White T-Shirt", 2, 5, 1200),
    (".NET Foundation T-shirt", 2, 2, 1200),
    ("Roslyn Red Sheet", 3, 5, 850),
    (".NET Blue Hoodie", 2, 2, 1200),
    ("Roslyn Red T-Shirt", 2, 5, 1200),
    ("Kudu Purple Hoodie", 2, 5, 850),
    ("Cup<T> White Mug", 1, 5, 1200),
    (".NET Foundation Sheet", 3, 2, 1200),
    ("Cup<T> Sheet", 3, 2, 850),
    ("Prism White TShirt", 2, 5, 1200),
];

pub fn catalog_types() -> Vec<CatalogType> {
    ["Mug", "T-Shirt", "Sheet", "USB Memory Stick"]
        .into_iter()
        .zip(1..)
        .map(|(name, id)| CatalogType {
            id,
            name: name.to_string(),
        })
        .collect()
}

pub fn catalog_brands() -> Vec<CatalogBrand> {
    ["Azure", ".NET", "Visual Studio", "SQL Server", "Other"]
        .into_iter()
        .zip(1..)
        .map(|(name, id)| CatalogBrand {
            id,
            name: name.to_string(),
        })
        .collect()
}

/// Sample items, unsaved (id 0). The n-th item shows picture `n.png`.
pub fn catalog_items() -> Vec<CatalogItem> {
    ITEMS
        .iter()
        .enumerate()
        .map(|(index, &(name, type_id, brand_id, cents))| {
            let mut item = CatalogItem::new(name, Money::from_cents(cents), type_id, brand_id);
            item.description = Some(name.to_string());
            item.picture_file_name = format!("{}.png", index + 1);
            item.available_stock = STOCK_UNITS;
            item
        })
        .collect()
}

/// Inserts the standard types and brands. Rows already present are kept.
pub async fn seed_lookups(pool: &SqlitePool) -> DbResult<()> {
    let mut tx = pool.begin().await?;

    for catalog_type in catalog_types() {
        sqlx::query("INSERT OR IGNORE INTO catalog_types (id, type) VALUES (?1, ?2)")
            .bind(catalog_type.id)
            .bind(&catalog_type.name)
            .execute(&mut *tx)
            .await?;
    }

    for brand in catalog_brands() {
        sqlx::query("INSERT OR IGNORE INTO catalog_brands (id, brand) VALUES (?1, ?2)")
            .bind(brand.id)
            .bind(&brand.name)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Creates each item through the repository, returning them with ids.
pub async fn seed_items(
    repo: &dyn CatalogRepository,
    items: Vec<CatalogItem>,
) -> DbResult<Vec<CatalogItem>> {
    let mut created = Vec::with_capacity(items.len());
    for item in items {
        created.push(repo.create(item).await?);
    }
    Ok(created)
}

/// Seeds lookups and sample items if the catalog has no items yet.
///
/// ## Returns
/// Number of items inserted (0 when the store was already populated).
pub async fn seed_if_empty(db: &Database) -> DbResult<usize> {
    seed_lookups(db.pool()).await?;

    let repo = db.catalog();
    let existing = repo.count().await?;
    if existing > 0 {
        info!(existing, "Catalog already populated, skipping seed");
        return Ok(0);
    }

    let created = seed_items(&repo, catalog_items()).await?;
    info!(items = created.len(), "Seeded preconfigured catalog");
    Ok(created.len())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use catalog_core::validation::validate_catalog_item;

    #[test]
    fn test_preconfigured_items_are_valid() {
        let items = catalog_items();
        assert_eq!(items.len(), 12);
        for item in &items {
            validate_catalog_item(item).unwrap();
        }
        assert_eq!(items[0].picture_file_name, "1.png");
        assert_eq!(items[11].picture_file_name, "12.png");
        assert_eq!(items[0].price().to_string(), "19.50");
    }

    #[test]
    fn test_lookup_ids_start_at_one() {
        assert_eq!(catalog_types()[0].id, 1);
        assert_eq!(catalog_types()[3].name, "USB Memory Stick");
        assert_eq!(catalog_brands()[4].id, 5);
    }

    #[tokio::test]
    async fn test_seed_if_empty_runs_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert_eq!(seed_if_empty(&db).await.unwrap(), 12);
        assert_eq!(seed_if_empty(&db).await.unwrap(), 0);
        assert_eq!(db.catalog().count().await.unwrap(), 12);

        let sheet = db.catalog().find(5).await.unwrap().unwrap();
        assert_eq!(sheet.item.name, "Roslyn Red Sheet");
        assert_eq!(sheet.catalog_type.name, "Sheet");
        assert_eq!(sheet.catalog_brand.name, "Other");
    }
}
