//! # Store Error Types
//!
//! Error types for catalog store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError (catalog-core)   sqlx::Error / MigrateError           │
//! │       │                                │                                │
//! │       ▼                                ▼                                │
//! │  DbError (this module) ← Categorized: StoreUnavailable, NotFound, ...  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller (UI layer) decides what to show; nothing is retried here       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both backends (SQLite and in-memory) report failures through the same
//! variants so callers cannot tell them apart.

use catalog_core::ValidationError;
use thiserror::Error;

/// Catalog store errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// The store could not be reached.
    ///
    /// ## When This Occurs
    /// - Database file can't be opened or created
    /// - Pool is closed or timed out waiting for a connection
    /// - I/O failure talking to the database
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Update/remove target does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Malformed input, rejected before the store was touched.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Item references a catalog_type_id that doesn't exist
    /// - Item references a catalog_brand_id that doesn't exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a ForeignKeyViolation error.
    pub fn foreign_key(message: impl Into<String>) -> Self {
        DbError::ForeignKeyViolation {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }

    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, DbError::StoreUnavailable(_))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::StoreUnavailable
/// sqlx::Error::PoolClosed     → DbError::StoreUnavailable
/// sqlx::Error::Io / Tls       → DbError::StoreUnavailable
/// Other                       → DbError::Internal
/// ```
///
/// `RowNotFound` never reaches callers as NotFound: lookups use
/// `fetch_optional` and mutations check `rows_affected`.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::foreign_key(msg)
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => {
                DbError::StoreUnavailable("Timed out waiting for a connection".to_string())
            }

            sqlx::Error::PoolClosed => DbError::StoreUnavailable("Pool is closed".to_string()),

            sqlx::Error::Io(io) => DbError::StoreUnavailable(io.to_string()),

            sqlx::Error::Tls(tls) => DbError::StoreUnavailable(tls.to_string()),

            sqlx::Error::WorkerCrashed => {
                DbError::StoreUnavailable("Database worker crashed".to_string())
            }

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        DbError::InvalidConfig(err.to_string())
    }
}

impl From<toml::de::Error> for DbError {
    fn from(err: toml::de::Error) -> Self {
        DbError::InvalidConfig(err.to_string())
    }
}

/// Result type for store operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
