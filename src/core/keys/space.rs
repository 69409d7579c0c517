//! Shard key ranges
//!
//! Separate runs (shards) are given distinct key starts so their extracts can
//! be loaded into the same warehouse. Dimension tables use a smaller key range
//! than detail tables.
//!
//! Dimension ranges of two shards are only `(b - a) / DIMENSION_KEY_DIVISOR`
//! keys apart. Shards started 1,000,000 apart can therefore hold 100 rows per
//! dimension table before the lower shard's keys run into the upper shard's.

use crate::domain::{CdwError, Result};

/// Divisor applied to the detail key start to get the dimension key start
pub const DIMENSION_KEY_DIVISOR: u64 = 10_000;

/// Key range assigned to one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpace {
    start: u64,
}

impl KeySpace {
    /// Creates a key space starting at `start`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `start` is zero.
    pub fn new(start: u64) -> Result<Self> {
        if start == 0 {
            return Err(CdwError::Configuration(
                "key_start must be at least 1".to_string(),
            ));
        }
        Ok(Self { start })
    }

    /// First key of every detail table
    pub fn detail_start(&self) -> u64 {
        self.start
    }

    /// First key of every dimension table
    pub fn dimension_start(&self) -> u64 {
        self.start / DIMENSION_KEY_DIVISOR
    }
}

impl Default for KeySpace {
    fn default() -> Self {
        Self { start: 1 }
    }
}
