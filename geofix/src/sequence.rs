//! Injected sequence generator.
//!
//! Fix sequence ids and photo ids come from a [`SequenceGenerator`] that the
//! caller creates and hands to the components that need one. Clones share
//! the same counter, so a caller can give one generator to several owners
//! and still get unique ids.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic id source shared by clones.
#[derive(Debug, Clone, Default)]
pub struct SequenceGenerator {
    next: Arc<AtomicU64>,
}

impl SequenceGenerator {
    /// Create a generator whose first id is 0.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a generator whose first id is `first`.
    ///
    /// Used when resuming numbering from persisted records.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: Arc::new(AtomicU64::new(first)),
        }
    }

    /// Take the next id.
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Peek at the id the next call will return.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}
