//! # Hi/Lo Identifier Window
//!
//! The pure half of Hi/Lo allocation: the in-process window of reserved
//! identifiers. Fetching a new block from the persisted counter is I/O and
//! lives in `catalog-db`.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Idle(low, high) ── low < high ──► return low, Idle(low + 1, high)    │
//! │        │                                                                │
//! │        │ low == high                                                    │
//! │        ▼                                                                │
//! │   Refilling ── counter += block_size ──► Idle(low', high')             │
//! │                (one store round trip)      then return low'            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use catalog_core::hilo::{HiLoBlock, HiLoState};
//!
//! let mut state = HiLoState::exhausted();
//! assert_eq!(state.try_next(), None);
//!
//! state.refill(HiLoBlock::new(1, 5).unwrap());
//! assert_eq!(state.try_next(), Some(1));
//! assert_eq!(state.remaining(), 4);
//! ```

use serde::{Deserialize, Serialize};

/// A reserved half-open identifier range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiLoBlock {
    pub start: i32,
    pub end: i32,
}

impl HiLoBlock {
    /// Builds the block `[start, start + size)`.
    ///
    /// Returns `None` if `size` is zero or the range overflows `i32`.
    pub fn new(start: i32, size: u32) -> Option<Self> {
        if size == 0 {
            return None;
        }
        let size = i32::try_from(size).ok()?;
        let end = start.checked_add(size)?;
        Some(HiLoBlock { start, end })
    }

    #[inline]
    pub fn len(&self) -> u32 {
        (self.end - self.start) as u32
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// The in-process `(low, high)` window of one allocator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HiLoState {
    low: i32,
    high: i32,
}

impl HiLoState {
    /// A window with nothing left; the first request forces a refill.
    pub const fn exhausted() -> Self {
        HiLoState { low: 0, high: 0 }
    }

    /// Hands out the next identifier, or `None` if the window is used up.
    pub fn try_next(&mut self) -> Option<i32> {
        if self.low < self.high {
            let id = self.low;
            self.low += 1;
            Some(id)
        } else {
            None
        }
    }

    /// Replaces the window with a freshly reserved block.
    ///
    /// Any identifiers left in the old window are abandoned, never reused.
    pub fn refill(&mut self, block: HiLoBlock) {
        debug_assert!(
            block.start >= self.high,
            "refill must move forward: {} < {}",
            block.start,
            self.high
        );
        self.low = block.start;
        self.high = block.end;
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        (self.high - self.low).max(0) as u32
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.low >= self.high
    }
}

impl Default for HiLoState {
    fn default() -> Self {
        HiLoState::exhausted()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_bounds() {
        let block = HiLoBlock::new(6, 5).unwrap();
        assert_eq!(block.start, 6);
        assert_eq!(block.end, 11);
        assert_eq!(block.len(), 5);

        assert!(HiLoBlock::new(1, 0).is_none());
        assert!(HiLoBlock::new(i32::MAX - 2, 5).is_none());
    }

    #[test]
    fn test_exhausted_window_yields_nothing() {
        let mut state = HiLoState::exhausted();
        assert!(state.is_exhausted());
        assert_eq!(state.try_next(), None);
        assert_eq!(state.remaining(), 0);
    }

    #[test]
    fn test_window_hands_out_block_in_order() {
        let mut state = HiLoState::default();
        state.refill(HiLoBlock::new(1, 3).unwrap());

        assert_eq!(state.try_next(), Some(1));
        assert_eq!(state.try_next(), Some(2));
        assert_eq!(state.try_next(), Some(3));
        assert_eq!(state.try_next(), None);
        assert!(state.is_exhausted());
    }

    #[test]
    fn test_monotonic_across_refill() {
        let mut state = HiLoState::exhausted();
        let mut issued = Vec::new();

        for start in [1, 6, 11] {
            state.refill(HiLoBlock::new(start, 5).unwrap());
            while let Some(id) = state.try_next() {
                issued.push(id);
            }
        }

        assert_eq!(issued, (1..16).collect::<Vec<_>>());
    }
}
