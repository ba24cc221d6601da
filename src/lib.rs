//! Extendible hash table.
//!
//! A directory of `2^global_depth` slots maps the low bits of a key's hash
//! to fixed-capacity buckets. A full bucket is split in two by the next
//! unused hash bit, and the directory doubles only when the bucket already
//! uses every directory bit. Typical use is the page table of a buffer pool:
//!
//! ```
//! use exhash::ExtendibleHashTable;
//!
//! let page_table = ExtendibleHashTable::new(4);
//! page_table.insert(7u64, 3usize).unwrap();
//!
//! assert_eq!(page_table.find(&7), Some(3));
//! assert!(page_table.remove(&7));
//! assert_eq!(page_table.find(&7), None);
//! ```

pub mod bucket;
pub mod config;
pub mod directory;
pub mod error;
pub mod table;

#[cfg(test)]
mod test_util;

pub use config::{TableConfig, DEFAULT_BUCKET_CAPACITY, MAX_DEPTH};
pub use error::{HashTableError, Result};
pub use table::ExtendibleHashTable;
