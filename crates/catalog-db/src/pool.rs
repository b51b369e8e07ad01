//! # Database Pool Management
//!
//! Connection pool creation and configuration for the SQLite catalog store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Catalog Store Startup                              │
//! │                                                                         │
//! │  DbConfig::new(path) ← Pool settings + Hi/Lo block size               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await                                           │
//! │       │   1. open pool (WAL, foreign keys)                             │
//! │       │   2. run migrations                                            │
//! │       │   3. build the shared HiLoAllocator                            │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │  Database { pool, allocator }           │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.catalog() ──► SqliteCatalogRepository (pool clone + Arc allocator) │
//! │                                                                         │
//! │  Every repository handed out by one Database shares one allocator,    │
//! │  so they draw from the same id window.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use catalog_core::{CATALOG_HILO_SEQUENCE, DEFAULT_HILO_BLOCK_SIZE};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::hilo::{HiLoAllocator, SqliteSequence};
use crate::migrations;
use crate::repository::catalog::SqliteCatalogRepository;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/catalog.db")
///     .max_connections(5)
///     .hilo_block_size(20);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a free connection before failing with
    /// `StoreUnavailable`.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,

    /// Ids reserved per Hi/Lo refill.
    /// Default: 10
    pub hilo_block_size: u32,
}

impl DbConfig {
    /// Creates a new configuration for the database file at `path`.
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
            hilo_block_size: DEFAULT_HILO_BLOCK_SIZE,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn hilo_block_size(mut self, size: u32) -> Self {
        self.hilo_block_size = size;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// The whole database lives inside one connection, so the pool is
    /// pinned to exactly one connection that is never recycled.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
            hilo_block_size: DEFAULT_HILO_BLOCK_SIZE,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(MEMORY_PATH)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// Cheap to clone: the pool and the allocator are both shared.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    allocator: Arc<HiLoAllocator>,
}

impl Database {
    /// Opens the pool, applies migrations and prepares the id allocator.
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use database handle
    /// * `Err(DbError::StoreUnavailable)` - File could not be opened
    /// * `Err(DbError::MigrationFailed)` - Schema could not be applied
    /// * `Err(DbError::InvalidConfig)` - Hi/Lo block size is zero
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            hilo_block_size = config.hilo_block_size,
            "Initializing catalog database"
        );

        if !config.is_in_memory() {
            ensure_parent_dir(&config.database_path)?;
        }

        let connect_options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
        } else {
            SqliteConnectOptions::from_str(&format!(
                "sqlite://{}",
                config.database_path.display()
            ))
        }
        .map_err(|e| DbError::StoreUnavailable(e.to_string()))?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        // SQLite ships with foreign keys off; items rely on them
        .foreign_keys(true)
        .create_if_missing(true);

        debug!("Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout);

        pool_options = if config.is_in_memory() {
            // Dropping the only connection would drop the database with it
            pool_options.idle_timeout(None).max_lifetime(None)
        } else {
            pool_options.idle_timeout(Some(config.idle_timeout))
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::StoreUnavailable(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let sequence = SqliteSequence::new(pool.clone(), CATALOG_HILO_SEQUENCE);
        let allocator = Arc::new(HiLoAllocator::new(
            Arc::new(sequence),
            config.hilo_block_size,
        )?);

        let db = Database { pool, allocator };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns `(total_migrations, applied_migrations)`.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    ///
    /// For seeding and diagnostics; catalog access goes through
    /// [`Database::catalog`].
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The id allocator shared by every repository from this handle.
    pub fn allocator(&self) -> &Arc<HiLoAllocator> {
        &self.allocator
    }

    /// Returns the catalog repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let page = db.catalog().list_paginated(10, 0).await?;
    /// ```
    pub fn catalog(&self) -> SqliteCatalogRepository {
        SqliteCatalogRepository::new(self.pool.clone(), self.allocator.clone())
    }

    /// Closes the connection pool.
    ///
    /// After this every repository operation fails with
    /// `DbError::StoreUnavailable`.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

/// Creates the directory holding the database file; SQLite only creates
/// the file itself.
fn ensure_parent_dir(database_path: &Path) -> DbResult<()> {
    let Some(parent) = database_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    else {
        return Ok(());
    };

    std::fs::create_dir_all(parent).map_err(|e| {
        DbError::StoreUnavailable(format!(
            "Cannot create database directory {}: {}",
            parent.display(),
            e
        ))
    })?;

    debug!(dir = %parent.display(), "Database directory ready");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
