//! Surrogate key allocation
//!
//! - [`sequence`] - per-table monotonic generators
//! - [`dedup`] - natural key deduplication for dimension tables
//! - [`space`] - shard key ranges

pub mod dedup;
pub mod sequence;
pub mod space;

pub use dedup::{DedupTable, DimensionRow};
pub use sequence::SequenceAllocator;
pub use space::{KeySpace, DIMENSION_KEY_DIVISOR};
