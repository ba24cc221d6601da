//! Fixed-capacity bucket.
//!
//! - Capacity fixed at construction, never exceeded
//! - Unordered entries, unique keys, linear scan lookups
//! - Local depth only ever grows (one step per split)

use std::borrow::Borrow;

/// Bounded collection of key-value pairs addressed by one or more
/// directory slots
#[derive(Debug, Clone)]
pub struct Bucket<K, V> {
    /// Maximum number of entries
    capacity: usize,

    /// Number of low hash bits shared by every key in this bucket
    depth: u8,

    /// Entries (unordered)
    entries: Vec<(K, V)>,
}

impl<K, V> Bucket<K, V> {
    /// Create new empty bucket
    pub fn new(capacity: usize, depth: u8) -> Self {
        debug_assert!(capacity > 0);
        Self {
            capacity,
            depth,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Number of occupied entries
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if bucket is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if bucket is full
    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get local depth
    #[inline]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Bump local depth by one, returning the new depth
    #[inline]
    pub fn increment_depth(&mut self) -> u8 {
        self.depth += 1;
        self.depth
    }

    /// Iterate over all entries
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Remove and return every entry whose key matches `pred`
    pub fn split_off<F>(&mut self, mut pred: F) -> Vec<(K, V)>
    where
        F: FnMut(&K) -> bool,
    {
        let (moved, kept) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|(k, _)| pred(k));
        self.entries = kept;
        moved
    }

    /// Append entries known to be absent from this bucket
    ///
    /// Used when filling a freshly split sibling.
    pub(crate) fn extend_unchecked(&mut self, entries: Vec<(K, V)>) {
        debug_assert!(self.entries.len() + entries.len() <= self.capacity);
        self.entries.extend(entries);
    }
}

impl<K, V> Bucket<K, V>
where
    K: Eq,
{
    fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.entries.iter().position(|(k, _)| k.borrow() == key)
    }

    /// Find value by key
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    /// Check if key exists
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.position(key).is_some()
    }

    /// Remove entry by key, returning it if present
    pub fn take<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let idx = self.position(key)?;
        Some(self.entries.swap_remove(idx))
    }

    /// Remove entry by key
    /// Return true if found and removed
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Insert or update an entry
    ///
    /// An existing key has its value replaced and the old value is returned;
    /// this never consumes capacity. A new key is rejected when the bucket is
    /// full and the pair is handed back unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, (K, V)> {
        if let Some(idx) = self.position(&key) {
            let old = std::mem::replace(&mut self.entries[idx].1, value);
            return Ok(Some(old));
        }

        if self.is_full() {
            return Err((key, value));
        }

        self.entries.push((key, value));
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bucket() {
        let bucket: Bucket<u64, u64> = Bucket::new(4, 0);
        assert!(bucket.is_empty());
        assert!(!bucket.is_full());
        assert_eq!(bucket.len(), 0);
        assert_eq!(bucket.capacity(), 4);
        assert_eq!(bucket.depth(), 0);
    }

    #[test]
    fn test_insert_and_find() {
        let mut bucket = Bucket::new(4, 0);

        assert_eq!(bucket.insert(1u64, "one"), Ok(None));
        assert_eq!(bucket.insert(2u64, "two"), Ok(None));

        assert_eq!(bucket.find(&1), Some(&"one"));
        assert_eq!(bucket.find(&2), Some(&"two"));
        assert_eq!(bucket.find(&3), None);
        assert_eq!(bucket.len(), 2);
    }

    #[test]
    fn test_update_does_not_consume_capacity() {
        let mut bucket = Bucket::new(2, 0);

        bucket.insert(1u64, 10u64).unwrap();
        bucket.insert(2u64, 20u64).unwrap();
        assert!(bucket.is_full());

        // full, but key exists: update goes through
        assert_eq!(bucket.insert(1, 11), Ok(Some(10)));
        assert_eq!(bucket.find(&1), Some(&11));
        assert_eq!(bucket.len(), 2);
    }

    #[test]
    fn test_full_bucket_rejects_new_key() {
        let mut bucket = Bucket::new(2, 0);

        bucket.insert(1u64, 10u64).unwrap();
        bucket.insert(2u64, 20u64).unwrap();

        assert_eq!(bucket.insert(3, 30), Err((3, 30)));
        assert_eq!(bucket.len(), 2);
        assert!(!bucket.contains(&3));
    }

    #[test]
    fn test_remove() {
        let mut bucket = Bucket::new(4, 0);

        bucket.insert(1u64, 10u64).unwrap();
        bucket.insert(2u64, 20u64).unwrap();

        assert!(bucket.remove(&1));
        assert!(!bucket.remove(&1));
        assert_eq!(bucket.find(&1), None);
        assert_eq!(bucket.find(&2), Some(&20));
        assert_eq!(bucket.take(&2), Some((2, 20)));
        assert!(bucket.is_empty());
        assert_eq!(bucket.depth(), 0);
    }

    #[test]
    fn test_remove_frees_capacity() {
        let mut bucket = Bucket::new(1, 0);

        bucket.insert(1u64, 10u64).unwrap();
        assert!(bucket.insert(2, 20).is_err());

        assert!(bucket.remove(&1));
        assert_eq!(bucket.insert(2, 20), Ok(None));
    }

    #[test]
    fn test_increment_depth() {
        let mut bucket: Bucket<u64, u64> = Bucket::new(4, 2);
        assert_eq!(bucket.increment_depth(), 3);
        assert_eq!(bucket.depth(), 3);
    }

    #[test]
    fn test_split_off() {
        let mut bucket = Bucket::new(8, 0);
        for i in 0u64..8 {
            bucket.insert(i, i * 10).unwrap();
        }

        let mut moved = bucket.split_off(|k| k & 1 == 1);
        moved.sort();

        assert_eq!(moved, vec![(1, 10), (3, 30), (5, 50), (7, 70)]);
        assert_eq!(bucket.len(), 4);
        for i in [0u64, 2, 4, 6] {
            assert_eq!(bucket.find(&i), Some(&(i * 10)));
        }

        let mut sibling = Bucket::new(8, 1);
        sibling.extend_unchecked(moved);
        assert_eq!(sibling.len(), 4);
        assert_eq!(sibling.find(&5), Some(&50));
    }

    #[test]
    fn test_borrow_lookup() {
        let mut bucket = Bucket::new(2, 0);
        bucket.insert("hello".to_string(), 1).unwrap();

        assert_eq!(bucket.find("hello"), Some(&1));
        assert!(bucket.contains("hello"));
        assert!(!bucket.contains("world"));
        assert!(bucket.remove("hello"));
    }
}
