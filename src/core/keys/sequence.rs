//! Monotonic surrogate key generator

use crate::domain::SurrogateKey;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-table monotonic key generator
///
/// Each table owns its own allocator, so allocations on different tables never
/// contend with each other.
#[derive(Debug)]
pub struct SequenceAllocator {
    start: u64,
    next: AtomicU64,
}

impl SequenceAllocator {
    /// Creates an allocator whose first key is `start`
    pub fn starting_at(start: u64) -> Self {
        Self {
            start,
            next: AtomicU64::new(start),
        }
    }

    /// Allocates the next key
    pub fn allocate(&self) -> SurrogateKey {
        SurrogateKey::new(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the key the next `allocate` call would hand out
    pub fn peek(&self) -> SurrogateKey {
        SurrogateKey::new(self.next.load(Ordering::Relaxed))
    }

    /// Number of keys handed out so far
    pub fn allocated(&self) -> u64 {
        self.next.load(Ordering::Relaxed) - self.start
    }
}
