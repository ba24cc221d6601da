//! Error types for `ExtendibleHashTable`

use thiserror::Error;

/// Errors reported by the table and its configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashTableError {
    #[error("bucket capacity must be greater than zero")]
    ZeroCapacity,

    #[error("max depth {requested} exceeds the supported maximum of {max}")]
    InvalidMaxDepth { requested: u8, max: u8 },

    #[error("directory slot {slot} out of range for directory of length {len}")]
    SlotOutOfRange { slot: usize, len: usize },

    /// The addressed bucket is full and already distinguishes keys by
    /// `depth` hash bits, so no further split can separate its entries.
    #[error("bucket at local depth {depth} cannot be split any further")]
    DepthExhausted { depth: u8 },

    #[error("directory integrity violated: {0}")]
    Corrupted(String),
}

pub type Result<T> = std::result::Result<T, HashTableError>;
