//! # Hi/Lo Identifier Allocator
//!
//! Hands out catalog item ids in blocks so that inserts don't need a trip
//! to the central counter for every single id.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Hi/Lo Allocation (block size 5)                      │
//! │                                                                         │
//! │  hilo_sequences: catalog_hilo.next_hi = 1                              │
//! │                                                                         │
//! │  next_id() ── window empty ──► UPDATE next_hi = next_hi + 5            │
//! │                                 RETURNING next_hi  (=6)                 │
//! │                                 window = [1, 6)        ← 1 round trip   │
//! │       → 1                                                               │
//! │  next_id() → 2, 3, 4, 5        (no store access)                       │
//! │  next_id() ── window empty ──► next_hi 6 → 11, window = [6, 11)        │
//! │       → 6                                                               │
//! │                                                                         │
//! │  Several allocators may share one counter: each refill is a single    │
//! │  atomic UPDATE, so no two allocators ever receive overlapping blocks.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking
//! The window sits behind a `tokio::sync::Mutex`. A refill runs while the
//! lock is held, so one allocator never has two refills in flight.

use async_trait::async_trait;
use catalog_core::{HiLoBlock, HiLoState};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{DbError, DbResult};

// =============================================================================
// Sequence Sources
// =============================================================================

/// A persisted counter that reserves identifier blocks.
#[async_trait]
pub trait SequenceSource: Send + Sync {
    /// Atomically advances the counter by `block_size` and returns the
    /// reserved block `[old, old + block_size)`.
    async fn reserve_block(&self, block_size: u32) -> DbResult<HiLoBlock>;
}

/// Counter stored as a row of the `hilo_sequences` table.
#[derive(Debug, Clone)]
pub struct SqliteSequence {
    pool: SqlitePool,
    name: String,
}

impl SqliteSequence {
    pub fn new(pool: SqlitePool, name: impl Into<String>) -> Self {
        SqliteSequence {
            pool,
            name: name.into(),
        }
    }

    /// Current counter value, i.e. the first id of the next block.
    pub async fn peek(&self) -> DbResult<Option<i64>> {
        let next_hi: Option<i64> =
            sqlx::query_scalar("SELECT next_hi FROM hilo_sequences WHERE name = ?1")
                .bind(&self.name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(next_hi)
    }
}

#[async_trait]
impl SequenceSource for SqliteSequence {
    async fn reserve_block(&self, block_size: u32) -> DbResult<HiLoBlock> {
        let size = i64::from(block_size);

        // Single statement: SQLite takes the write lock for the whole
        // read-modify-write, so concurrent reservers serialize here.
        let next_hi: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE hilo_sequences
            SET next_hi = next_hi + ?1
            WHERE name = ?2
            RETURNING next_hi
            "#,
        )
        .bind(size)
        .bind(&self.name)
        .fetch_optional(&self.pool)
        .await?;

        let next_hi = next_hi.ok_or_else(|| DbError::not_found("HiLoSequence", &self.name))?;

        block_from_counter(next_hi - size, block_size)
    }
}

/// Process-local counter for the in-memory backend.
#[derive(Debug)]
pub struct InMemorySequence {
    next_hi: AtomicI64,
}

impl InMemorySequence {
    /// A counter whose first block starts at `start`.
    pub fn starting_at(start: i64) -> Self {
        InMemorySequence {
            next_hi: AtomicI64::new(start),
        }
    }

    pub fn peek(&self) -> i64 {
        self.next_hi.load(Ordering::SeqCst)
    }
}

impl Default for InMemorySequence {
    fn default() -> Self {
        InMemorySequence::starting_at(1)
    }
}

#[async_trait]
impl SequenceSource for InMemorySequence {
    async fn reserve_block(&self, block_size: u32) -> DbResult<HiLoBlock> {
        let start = self
            .next_hi
            .fetch_add(i64::from(block_size), Ordering::SeqCst);

        block_from_counter(start, block_size)
    }
}

fn block_from_counter(start: i64, block_size: u32) -> DbResult<HiLoBlock> {
    i32::try_from(start)
        .ok()
        .and_then(|start| HiLoBlock::new(start, block_size))
        .ok_or_else(|| {
            DbError::Internal(format!(
                "Hi/Lo block starting at {} with size {} is outside the id range",
                start, block_size
            ))
        })
}

// =============================================================================
// Allocator
// =============================================================================

/// Hi/Lo identifier allocator.
///
/// ## Usage
/// ```rust,ignore
/// let allocator = HiLoAllocator::new(Arc::new(SqliteSequence::new(pool, "catalog_hilo")), 10)?;
/// let id = allocator.next_id().await?;
/// ```
pub struct HiLoAllocator {
    source: Arc<dyn SequenceSource>,
    block_size: u32,
    state: Mutex<HiLoState>,
    refills: AtomicU64,
}

impl std::fmt::Debug for HiLoAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HiLoAllocator")
            .field("block_size", &self.block_size)
            .field("refills", &self.refills.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl HiLoAllocator {
    /// Creates an allocator with an empty window.
    ///
    /// ## Returns
    /// * `Err(DbError::InvalidConfig)` - `block_size` is zero
    pub fn new(source: Arc<dyn SequenceSource>, block_size: u32) -> DbResult<Self> {
        if block_size == 0 || i32::try_from(block_size).is_err() {
            return Err(DbError::InvalidConfig(format!(
                "Hi/Lo block size must be between 1 and {}, got {}",
                i32::MAX,
                block_size
            )));
        }

        Ok(HiLoAllocator {
            source,
            block_size,
            state: Mutex::new(HiLoState::exhausted()),
            refills: AtomicU64::new(0),
        })
    }

    /// Returns the next identifier, refilling from the store if needed.
    ///
    /// ## Returns
    /// * `Ok(id)` - Unique, larger than every id this allocator issued before
    /// * `Err(DbError::StoreUnavailable)` - Refill needed but the store is down;
    ///   the window is left as it was
    pub async fn next_id(&self) -> DbResult<i32> {
        let mut state = self.state.lock().await;

        if let Some(id) = state.try_next() {
            return Ok(id);
        }

        let block = self.source.reserve_block(self.block_size).await?;
        let refills = self.refills.fetch_add(1, Ordering::Relaxed) + 1;

        debug!(
            block_start = block.start,
            block_end = block.end,
            refills,
            "Reserved Hi/Lo block"
        );

        state.refill(block);
        state
            .try_next()
            .ok_or_else(|| DbError::Internal("Reserved an empty Hi/Lo block".to_string()))
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Number of store round trips made so far.
    pub fn refill_count(&self) -> u64 {
        self.refills.load(Ordering::Relaxed)
    }

    /// Identifiers left in the current window.
    pub async fn remaining(&self) -> u32 {
        self.state.lock().await.remaining()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use catalog_core::CATALOG_HILO_SEQUENCE;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicBool;

    /// Sequence that can be switched off to simulate an unreachable store.
    struct FlakySequence {
        inner: InMemorySequence,
        down: AtomicBool,
    }

    #[async_trait]
    impl SequenceSource for FlakySequence {
        async fn reserve_block(&self, block_size: u32) -> DbResult<HiLoBlock> {
            if self.down.load(Ordering::SeqCst) {
                return Err(DbError::StoreUnavailable("connection refused".to_string()));
            }
            self.inner.reserve_block(block_size).await
        }
    }

    #[tokio::test]
    async fn test_zero_block_size_rejected() {
        let result = HiLoAllocator::new(Arc::new(InMemorySequence::default()), 0);
        assert!(matches!(result, Err(DbError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_consecutive_ids_strictly_increase() {
        let allocator = HiLoAllocator::new(Arc::new(InMemorySequence::default()), 4).unwrap();

        let mut previous = 0;
        for _ in 0..25 {
            let id = allocator.next_id().await.unwrap();
            assert!(id > previous);
            previous = id;
        }

        assert_eq!(previous, 25);
        // 25 ids from blocks of 4 → 7 refills
        assert_eq!(allocator.refill_count(), 7);
    }

    #[tokio::test]
    async fn test_block_of_five_refills_on_sixth() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let source = Arc::new(SqliteSequence::new(db.pool().clone(), CATALOG_HILO_SEQUENCE));
        let allocator = HiLoAllocator::new(source.clone(), 5).unwrap();

        for expected in 1..=5 {
            assert_eq!(allocator.next_id().await.unwrap(), expected);
        }
        assert_eq!(allocator.refill_count(), 1);
        assert_eq!(source.peek().await.unwrap(), Some(6));

        assert_eq!(allocator.next_id().await.unwrap(), 6);
        assert_eq!(allocator.refill_count(), 2);
        assert_eq!(source.peek().await.unwrap(), Some(11));
    }

    #[tokio::test]
    async fn test_allocators_sharing_counter_never_overlap() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = HiLoAllocator::new(
            Arc::new(SqliteSequence::new(db.pool().clone(), CATALOG_HILO_SEQUENCE)),
            3,
        )
        .unwrap();
        let b = HiLoAllocator::new(
            Arc::new(SqliteSequence::new(db.pool().clone(), CATALOG_HILO_SEQUENCE)),
            4,
        )
        .unwrap();

        let mut seen = HashSet::new();
        for _ in 0..20 {
            assert!(seen.insert(a.next_id().await.unwrap()));
            assert!(seen.insert(b.next_id().await.unwrap()));
        }
        assert_eq!(seen.len(), 40);
    }

    #[tokio::test]
    async fn test_concurrent_callers_get_distinct_ids() {
        let allocator =
            Arc::new(HiLoAllocator::new(Arc::new(InMemorySequence::default()), 3).unwrap());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let allocator = allocator.clone();
            handles.push(tokio::spawn(async move {
                let mut ids = Vec::new();
                for _ in 0..10 {
                    ids.push(allocator.next_id().await.unwrap());
                }
                ids
            }));
        }

        let mut all = HashSet::new();
        for handle in handles {
            for id in handle.await.unwrap() {
                assert!(all.insert(id), "id {} issued twice", id);
            }
        }
        assert_eq!(all.len(), 160);
    }

    #[tokio::test]
    async fn test_refill_failure_surfaces_and_recovers() {
        let source = Arc::new(FlakySequence {
            inner: InMemorySequence::default(),
            down: AtomicBool::new(false),
        });
        let allocator = HiLoAllocator::new(source.clone(), 2).unwrap();

        assert_eq!(allocator.next_id().await.unwrap(), 1);
        assert_eq!(allocator.next_id().await.unwrap(), 2);

        source.down.store(true, Ordering::SeqCst);
        let err = allocator.next_id().await.unwrap_err();
        assert!(err.is_store_unavailable());
        assert_eq!(allocator.remaining().await, 0);

        source.down.store(false, Ordering::SeqCst);
        assert_eq!(allocator.next_id().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_missing_sequence_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let source = SqliteSequence::new(db.pool().clone(), "no_such_sequence");

        let err = source.reserve_block(5).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
