use std::borrow::Borrow;

use log::{debug, warn};

use crate::bucket::Bucket;
use crate::config::TableConfig;
use crate::error::{HashTableError, Result};

pub struct Directory<K, V> {
    /// Bucket storage (owns buckets, never shrinks)
    buckets: Vec<Bucket<K, V>>,

    /// Directory mapping low hash bits to bucket indices
    slots: Vec<usize>,

    /// Global depth (slots.len() == 2^global_depth)
    global_depth: u8,

    /// Capacity handed to every bucket
    bucket_capacity: usize,

    /// No bucket is split past this depth
    max_depth: u8,

    /// Total entries across all buckets
    len: usize,
}

impl<K, V> Directory<K, V> {
    /// Create a new directory with a single empty bucket
    ///
    /// `config` is expected to have been validated.
    pub fn new(config: &TableConfig) -> Self {
        debug_assert!(config.validate().is_ok());
        Self {
            buckets: vec![Bucket::new(config.bucket_capacity, 0)],
            slots: vec![0],
            global_depth: 0,
            bucket_capacity: config.bucket_capacity,
            max_depth: config.max_depth,
            len: 0,
        }
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if directory is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct buckets
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Global depth
    #[inline]
    pub fn global_depth(&self) -> u8 {
        self.global_depth
    }

    #[inline]
    pub fn bucket_capacity(&self) -> usize {
        self.bucket_capacity
    }

    /// Number of directory slots
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Local depth of the bucket behind `slot`, if the slot exists
    pub fn local_depth(&self, slot: usize) -> Option<u8> {
        self.slots.get(slot).map(|&idx| self.buckets[idx].depth())
    }

    /// Compute directory slot from hash (uses LOW bits)
    #[inline]
    fn slot_index(&self, hash: u64) -> usize {
        (hash as usize) & ((1usize << self.global_depth) - 1)
    }

    /// Get bucket index for a given hash
    #[inline]
    fn bucket_index(&self, hash: u64) -> usize {
        self.slots[self.slot_index(hash)]
    }

    /// Double the directory size
    fn grow_directory(&mut self) {
        // Slot i of the doubled directory aliases old slot i & old_mask:
        // [A, B] -> [A, B, A, B]
        self.slots.extend_from_within(..);
        self.global_depth += 1;
        debug!(
            "Directory grown to global depth {} ({} slots)",
            self.global_depth,
            self.slots.len()
        );
    }
}

impl<K, V> Directory<K, V>
where
    K: Eq,
{
    /// Get value by hash and key
    pub fn get<Q>(&self, hash: u64, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.buckets[self.bucket_index(hash)].find(key)
    }

    /// Check if key exists
    pub fn contains_key<Q>(&self, hash: u64, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.buckets[self.bucket_index(hash)].contains(key)
    }

    /// Remove entry
    pub fn remove<Q>(&mut self, hash: u64, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let idx = self.bucket_index(hash);
        let (_, value) = self.buckets[idx].take(key)?;
        self.len -= 1;
        Some(value)
    }

    /// Split the bucket addressed by `hash`, growing the directory first
    /// when the bucket already uses every directory bit
    fn split_bucket<F>(&mut self, hash: u64, hash_fn: &mut F) -> Result<()>
    where
        F: FnMut(&K) -> u64,
    {
        let slot = self.slot_index(hash);
        let bucket_idx = self.slots[slot];
        let local_depth = self.buckets[bucket_idx].depth();

        if local_depth >= self.max_depth {
            warn!(
                "Bucket {} is full at max depth {}, cannot split",
                bucket_idx, local_depth
            );
            return Err(HashTableError::DepthExhausted { depth: local_depth });
        }

        if local_depth == self.global_depth {
            self.grow_directory();
        }

        let new_depth = self.buckets[bucket_idx].increment_depth();
        let split_bit = 1usize << (new_depth - 1);

        // entries with the newly significant bit set move to the sibling
        let moved = self.buckets[bucket_idx].split_off(|k| (hash_fn(k) as usize) & split_bit != 0);
        let moved_count = moved.len();

        let mut sibling = Bucket::new(self.bucket_capacity, new_depth);
        sibling.extend_unchecked(moved);

        let sibling_idx = self.buckets.len();
        self.buckets.push(sibling);

        // Slots aliasing the old bucket agree with `slot` on the low
        // `local_depth` bits. Those that also have `split_bit` set now
        // belong to the sibling.
        let first = (slot & (split_bit - 1)) | split_bit;
        let step = split_bit << 1;
        for i in (first..self.slots.len()).step_by(step) {
            debug_assert_eq!(self.slots[i], bucket_idx);
            self.slots[i] = sibling_idx;
        }

        debug!(
            "Split bucket {} at depth {} into sibling {} (moved {} entries)",
            bucket_idx, new_depth, sibling_idx, moved_count
        );
        Ok(())
    }

    /// Insert key-value pair, splitting until the addressed bucket has room
    ///
    /// Returns the previous value when the key was already present.
    pub fn insert<F>(&mut self, hash: u64, key: K, value: V, mut hash_fn: F) -> Result<Option<V>>
    where
        F: FnMut(&K) -> u64,
    {
        let mut key = key;
        let mut value = value;

        loop {
            let bucket_idx = self.bucket_index(hash);
            match self.buckets[bucket_idx].insert(key, value) {
                Ok(old) => {
                    if old.is_none() {
                        self.len += 1;
                    }
                    return Ok(old);
                }
                Err((k, v)) => {
                    key = k;
                    value = v;
                    self.split_bucket(hash, &mut hash_fn)?;
                }
            }
        }
    }

    /// Check every structural invariant of the directory
    pub fn verify_integrity<F>(&self, mut hash_fn: F) -> Result<()>
    where
        F: FnMut(&K) -> u64,
    {
        let corrupted = |msg: String| Err(HashTableError::Corrupted(msg));

        if self.slots.len() != 1usize << self.global_depth {
            return corrupted(format!(
                "{} slots at global depth {}",
                self.slots.len(),
                self.global_depth
            ));
        }

        // low bits shared by every slot referencing a bucket
        let mut owner_bits: Vec<Option<usize>> = vec![None; self.buckets.len()];
        let mut refs = vec![0usize; self.buckets.len()];

        for (slot, &idx) in self.slots.iter().enumerate() {
            let Some(bucket) = self.buckets.get(idx) else {
                return corrupted(format!("slot {} points to missing bucket {}", slot, idx));
            };
            if bucket.depth() > self.global_depth {
                return corrupted(format!(
                    "bucket {} has local depth {} above global depth {}",
                    idx,
                    bucket.depth(),
                    self.global_depth
                ));
            }

            let low = slot & ((1usize << bucket.depth()) - 1);
            let seen = owner_bits[idx];
            match seen {
                None => owner_bits[idx] = Some(low),
                Some(bits) if bits != low => {
                    return corrupted(format!(
                        "bucket {} aliased by slots with low bits {:#b} and {:#b}",
                        idx, bits, low
                    ));
                }
                Some(_) => {}
            }
            refs[idx] += 1;
        }

        let mut total = 0;
        for (idx, bucket) in self.buckets.iter().enumerate() {
            let Some(low) = owner_bits[idx] else {
                return corrupted(format!("bucket {} is not referenced by any slot", idx));
            };

            let expected = 1usize << (self.global_depth - bucket.depth());
            if refs[idx] != expected {
                return corrupted(format!(
                    "bucket {} referenced by {} slots, expected {}",
                    idx, refs[idx], expected
                ));
            }

            if bucket.len() > bucket.capacity() {
                return corrupted(format!(
                    "bucket {} holds {} entries over capacity {}",
                    idx,
                    bucket.len(),
                    bucket.capacity()
                ));
            }

            let mask = (1usize << bucket.depth()) - 1;
            if bucket.iter().any(|(k, _)| (hash_fn(k) as usize) & mask != low) {
                return corrupted(format!("bucket {} holds a misplaced entry", idx));
            }

            total += bucket.len();
        }

        if total != self.len {
            return corrupted(format!("counted {} entries, expected {}", total, self.len));
        }

        Ok(())
    }
}
