//! # catalog-core: Pure Domain Logic for the Catalog Store
//!
//! This crate holds the catalog domain as pure types and functions with zero
//! I/O dependencies. Store access lives in `catalog-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Catalog Store Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Catalog admin UI (grid, edit forms)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Arc<dyn CatalogRepository>            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                catalog-db (SQLite / in-memory)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ catalog-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌──────────┐   │   │
//! │  │   │   types   │  │   money   │  │ validation │  │   hilo   │   │   │
//! │  │   │CatalogItem│  │   Money   │  │ item rules │  │ HiLoState│   │   │
//! │  │   │ Paginated │  │           │  │ page rules │  │          │   │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └──────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CatalogItem, CatalogType, CatalogBrand, pages)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Validation error types
//! - [`validation`] - Item and page request validation
//! - [`hilo`] - In-process Hi/Lo identifier window
//!
//! ## Example Usage
//!
//! ```rust
//! use catalog_core::money::Money;
//!
//! let price: Money = "19.50".parse().unwrap();
//! assert_eq!(price.cents(), 1950);
//! assert_eq!(price.to_string(), "19.50");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod hilo;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use hilo::{HiLoBlock, HiLoState};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used by the catalog grid when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on a single page request.
///
/// Keeps one grid request from pulling the whole catalog in a single query.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Number of identifiers reserved per Hi/Lo round trip unless configured.
pub const DEFAULT_HILO_BLOCK_SIZE: u32 = 10;

/// Name of the persisted Hi/Lo counter used for catalog items.
pub const CATALOG_HILO_SEQUENCE: &str = "catalog_hilo";

/// Picture reference stored when an item is created without one.
pub const DEFAULT_PICTURE_FILE_NAME: &str = "dummy.png";

/// Largest accepted item price, in cents (1,000,000.00).
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Largest accepted stock or threshold count.
pub const MAX_STOCK_UNITS: i32 = 10_000_000;
