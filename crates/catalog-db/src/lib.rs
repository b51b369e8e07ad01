//! # catalog-db: Store Access for the Catalog
//!
//! Everything that touches catalog storage: the SQLite pool and schema,
//! the Hi/Lo id allocator, both repository backends and the configuration
//! that picks between them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Catalog Data Flow                                │
//! │                                                                         │
//! │  UI layer (grid, admin forms)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  open_catalog(&CatalogConfig) ──► Arc<dyn CatalogRepository>          │
//! │       │                                                                 │
//! │  ┌────┴────────────────────────────────────────────────────────────┐   │
//! │  │                   catalog-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   use_mock_data = false            use_mock_data = true        │   │
//! │  │   ┌────────────────────────┐      ┌────────────────────────┐   │   │
//! │  │   │ SqliteCatalogRepository│      │InMemoryCatalogRepository│  │   │
//! │  │   │  Database (pool.rs)    │      │  BTreeMaps + RwLock    │   │   │
//! │  │   │  HiLoAllocator         │      │  HiLoAllocator         │   │   │
//! │  │   │   └ SqliteSequence     │      │   └ InMemorySequence   │   │   │
//! │  │   └────────────────────────┘      └────────────────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file  (catalog_types, catalog_brands, catalog_items,          │
//! │                hilo_sequences)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`hilo`] - Hi/Lo id allocation over a persisted counter
//! - [`repository`] - The `CatalogRepository` trait and its two backends
//! - [`seed`] - Preconfigured types, brands and sample items
//! - [`config`] - `catalog.toml` + environment configuration
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use catalog_db::{open_catalog, CatalogConfig};
//!
//! let config = CatalogConfig::load(None)?;
//! let catalog = open_catalog(&config).await?;
//!
//! let page = catalog.list_paginated(10, 0).await?;
//! println!("{} of {} items", page.data.len(), page.count);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod hilo;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CatalogConfig, HiLoSettings, StoreSettings};
pub use error::{DbError, DbResult};
pub use hilo::{HiLoAllocator, InMemorySequence, SequenceSource, SqliteSequence};
pub use pool::{Database, DbConfig};

pub use repository::catalog::SqliteCatalogRepository;
pub use repository::memory::InMemoryCatalogRepository;
pub use repository::CatalogRepository;

use std::sync::Arc;
use tracing::info;

/// Builds the repository selected by `config`.
///
/// ## What This Does
/// - `use_mock_data = true`: in-memory catalog, pre-populated when
///   `seed_on_startup` is set
/// - `use_mock_data = false`: opens (and migrates) the SQLite file, then
///   seeds it if it is empty and `seed_on_startup` is set
pub async fn open_catalog(config: &CatalogConfig) -> DbResult<Arc<dyn CatalogRepository>> {
    config.validate()?;

    if config.store.use_mock_data {
        info!(
            seeded = config.store.seed_on_startup,
            "Opening in-memory catalog"
        );

        let repo = if config.store.seed_on_startup {
            InMemoryCatalogRepository::preconfigured(config.hilo.block_size).await?
        } else {
            InMemoryCatalogRepository::with_lookups(config.hilo.block_size)?
        };
        return Ok(Arc::new(repo));
    }

    let db = Database::new(config.db_config()).await?;

    if config.store.seed_on_startup {
        seed::seed_if_empty(&db).await?;
    } else {
        seed::seed_lookups(db.pool()).await?;
    }

    Ok(Arc::new(db.catalog()))
}
