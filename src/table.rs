use std::{
    borrow::Borrow,
    hash::{BuildHasher, Hash, RandomState},
};

use log::{debug, trace};
use parking_lot::RwLock;

use crate::config::{TableConfig, DEFAULT_BUCKET_CAPACITY};
use crate::directory::Directory;
use crate::error::{HashTableError, Result};

/// A thread-safe hash table using extendible hashing
///
/// The directory doubles when a full bucket already uses every directory
/// bit; otherwise only the overflowing bucket is split. Entries are never
/// rehashed wholesale and the directory never shrinks.
///
/// A single readers-writer lock covers the whole directory. Lookups and
/// introspection share it, `insert` and `remove` hold it exclusively for
/// their entire critical section, including any splits.
pub struct ExtendibleHashTable<K, V, S = RandomState> {
    directory: RwLock<Directory<K, V>>,
    hash_builder: S,
}

impl<K, V> ExtendibleHashTable<K, V, RandomState> {
    /// Create an empty table whose buckets hold `bucket_capacity` entries
    ///
    /// # Panics
    ///
    /// Panics if `bucket_capacity` is zero.
    #[inline]
    pub fn new(bucket_capacity: usize) -> Self {
        Self::with_hasher(bucket_capacity, RandomState::new())
    }

    /// Create an empty table from a validated config
    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, RandomState::new())
    }
}

impl<K, V, S> ExtendibleHashTable<K, V, S> {
    /// Create an empty table with provided hasher
    ///
    /// # Panics
    ///
    /// Panics if `bucket_capacity` is zero.
    pub fn with_hasher(bucket_capacity: usize, hash_builder: S) -> Self {
        assert!(
            bucket_capacity > 0,
            "bucket capacity must be greater than zero"
        );
        Self::build(TableConfig::new(bucket_capacity), hash_builder)
    }

    /// Create an empty table with provided config and hasher
    pub fn with_config_and_hasher(config: TableConfig, hash_builder: S) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, hash_builder))
    }

    fn build(config: TableConfig, hash_builder: S) -> Self {
        debug!(
            "Initializing ExtendibleHashTable with bucket capacity {} and max depth {}",
            config.bucket_capacity, config.max_depth
        );
        Self {
            directory: RwLock::new(Directory::new(&config)),
            hash_builder,
        }
    }

    /// Returns the number of elements in the table
    #[inline]
    pub fn len(&self) -> usize {
        self.directory.read().len()
    }

    /// Returns `true` if the table contains no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.directory.read().is_empty()
    }

    /// Returns a reference to the hasher
    #[inline]
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Maximum number of entries per bucket
    #[inline]
    pub fn bucket_capacity(&self) -> usize {
        self.directory.read().bucket_capacity()
    }

    /// Returns the global depth of the directory
    #[inline]
    pub fn global_depth(&self) -> u8 {
        self.directory.read().global_depth()
    }

    /// Returns the number of distinct buckets
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.directory.read().bucket_count()
    }

    /// Returns the local depth of the bucket referenced by directory slot `slot`
    ///
    /// # Panics
    ///
    /// Panics if `slot` is not below `2^global_depth`.
    pub fn local_depth(&self, slot: usize) -> u8 {
        match self.try_local_depth(slot) {
            Ok(depth) => depth,
            Err(err) => panic!("{}", err),
        }
    }

    /// Fallible version of [`local_depth`](Self::local_depth)
    pub fn try_local_depth(&self, slot: usize) -> Result<u8> {
        let directory = self.directory.read();
        directory
            .local_depth(slot)
            .ok_or(HashTableError::SlotOutOfRange {
                slot,
                len: directory.slot_count(),
            })
    }
}

impl<K, V, S> ExtendibleHashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    #[inline]
    fn hash<Q>(&self, key: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hash_builder.hash_one(key)
    }

    /// Returns a clone of the value associated with the given key
    pub fn find<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let hash = self.hash(key);
        self.directory.read().get(hash, key).cloned()
    }

    /// Return `true` if the table contains a value for the given key
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash(key);
        self.directory.read().contains_key(hash, key)
    }

    /// Inserts a key-value pair into the table
    ///
    /// An existing key has its value replaced in place. A new key may split
    /// buckets and grow the directory until its bucket has room.
    ///
    /// # Errors
    ///
    /// Returns [`HashTableError::DepthExhausted`] when the key's bucket is
    /// full and already at the configured max depth. This only happens when
    /// more than `bucket_capacity` keys collide on every addressable hash
    /// bit. No entry is added or lost in that case, though splits made
    /// before the bound was reached are kept.
    pub fn insert(&self, key: K, value: V) -> Result<()> {
        let hash = self.hash(&key);
        let hash_builder = &self.hash_builder;

        let mut directory = self.directory.write();
        let old = directory.insert(hash, key, value, |k| hash_builder.hash_one(k))?;
        trace!(
            "Inserted key with hash {:#x} ({})",
            hash,
            if old.is_some() { "updated" } else { "new" }
        );
        Ok(())
    }

    /// Removes a key from the table
    ///
    /// Returns `true` if the key was present. Buckets are never merged.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash(key);
        let removed = self.directory.write().remove(hash, key).is_some();
        trace!("Remove of key with hash {:#x}: {}", hash, removed);
        removed
    }

    /// Checks capacity, depth and aliasing invariants of the whole table
    pub fn verify_integrity(&self) -> Result<()> {
        let hash_builder = &self.hash_builder;
        self.directory
            .read()
            .verify_integrity(|k| hash_builder.hash_one(k))
    }
}

impl<K, V> Default for ExtendibleHashTable<K, V, RandomState> {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET_CAPACITY)
    }
}
