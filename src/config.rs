//! Table configuration

use crate::error::{HashTableError, Result};

/// Bucket capacity used by `TableConfig::default()`
pub const DEFAULT_BUCKET_CAPACITY: usize = 4;

/// Deepest directory the table can address.
///
/// A directory of global depth `d` holds `1 << d` slots, so the depth has to
/// stay strictly below the width of `usize`.
pub const MAX_DEPTH: u8 = (usize::BITS - 1) as u8;

/// Construction parameters for `ExtendibleHashTable`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    /// Maximum number of entries per bucket
    pub bucket_capacity: usize,

    /// Upper bound on local (and therefore global) depth
    pub max_depth: u8,
}

impl TableConfig {
    /// Config with the given bucket capacity and the default depth bound
    pub fn new(bucket_capacity: usize) -> Self {
        Self {
            bucket_capacity,
            max_depth: MAX_DEPTH,
        }
    }

    pub fn with_bucket_capacity(mut self, bucket_capacity: usize) -> Self {
        self.bucket_capacity = bucket_capacity;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check that the config describes a usable table
    pub fn validate(&self) -> Result<()> {
        if self.bucket_capacity == 0 {
            return Err(HashTableError::ZeroCapacity);
        }
        if self.max_depth > MAX_DEPTH {
            return Err(HashTableError::InvalidMaxDepth {
                requested: self.max_depth,
                max: MAX_DEPTH,
            });
        }
        Ok(())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET_CAPACITY)
    }
}
