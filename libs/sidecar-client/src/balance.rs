//! Lock-free round-robin index generator.
//!
//! [`RotatingIndex`] hands out positions `0..size` in a perpetual cycle. It is
//! shared by every caller of a [`crate::pool::ConnectionPool`] and never blocks.
//!
//! The counter is a plain `usize` advanced with a compare-and-swap. When it
//! reaches `usize::MAX` it folds back to the next value of the same residue
//! class instead of wrapping to zero, so the cycle stays strict across the
//! overflow boundary even when `size` does not divide `2^64`.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::PoolError;

/// Cyclic position generator over a fixed pool size.
#[derive(Debug)]
pub struct RotatingIndex {
    size: NonZeroUsize,
    counter: AtomicUsize,
}

impl RotatingIndex {
    /// Creates an index over `size` positions, starting at position `0`.
    ///
    /// # Errors
    /// Returns [`PoolError::ZeroSize`] if `size` is zero.
    pub fn new(size: usize) -> Result<Self, PoolError> {
        Self::with_start(size, 0)
    }

    /// Creates an index whose internal counter starts at `start`.
    ///
    /// The first call to [`next`](Self::next) returns `start % size`.
    ///
    /// # Errors
    /// Returns [`PoolError::ZeroSize`] if `size` is zero.
    pub fn with_start(size: usize, start: usize) -> Result<Self, PoolError> {
        let size = NonZeroUsize::new(size).ok_or(PoolError::ZeroSize)?;
        Ok(Self {
            size,
            counter: AtomicUsize::new(start),
        })
    }

    /// A new index over the same size, starting again at position `0`.
    #[must_use]
    pub(crate) fn restarted(&self) -> Self {
        Self {
            size: self.size,
            counter: AtomicUsize::new(0),
        }
    }

    /// Number of positions in the rotation.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size.get()
    }

    /// Returns the current position and advances the rotation.
    ///
    /// Safe to call concurrently: every caller consumes a distinct counter
    /// value, so a burst of `k * size` calls visits each position exactly `k`
    /// times.
    #[must_use]
    pub fn next(&self) -> usize {
        let size = self.size.get();
        let current = match self
            .counter
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |c| {
                Some(advance(c, size))
            }) {
            Ok(c) | Err(c) => c,
        };
        current % size
    }
}

/// Successor of `counter`, congruent to `counter + 1` modulo `size`.
fn advance(counter: usize, size: usize) -> usize {
    counter
        .checked_add(1)
        .unwrap_or_else(|| counter % size + 1)
}
