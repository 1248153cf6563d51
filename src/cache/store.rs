//! Bucket Store Module
//!
//! Fixed array of independently locked key/value maps.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Bucket<V> = RwLock<HashMap<String, V>>;

// == Bucket Store ==
/// Array of buckets, each guarded by its own `RwLock`.
///
/// Callers pick the bucket index (normally through `HashRouter`); operations
/// on different buckets never contend. A poisoned bucket lock is recovered,
/// since a map insert or remove cannot leave the map half-updated.
#[derive(Debug)]
pub struct BucketStore<V> {
    buckets: Box<[Bucket<V>]>,
}

impl<V: Clone> BucketStore<V> {
    // == Constructor ==
    /// Creates `bucket_count` empty buckets.
    pub(crate) fn new(bucket_count: usize) -> Self {
        let buckets = (0..bucket_count)
            .map(|_| RwLock::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self { buckets }
    }

    // == Set ==
    /// Inserts or overwrites `key` in bucket `index`.
    pub fn set(&self, index: usize, key: String, value: V) {
        self.write(index).insert(key, value);
    }

    // == Get ==
    /// Returns a clone of the value stored for `key`, if any.
    pub fn get(&self, index: usize, key: &str) -> Option<V> {
        self.read(index).get(key).cloned()
    }

    // == Delete ==
    /// Removes `key` from bucket `index`. Returns whether an entry was removed.
    pub fn delete(&self, index: usize, key: &str) -> bool {
        self.write(index).remove(key).is_some()
    }

    // == Length ==
    /// Total entries across all buckets. Buckets are counted one at a time,
    /// so the result is approximate under concurrent writes.
    pub fn len(&self) -> usize {
        (0..self.buckets.len()).map(|i| self.read(i).len()).sum()
    }

    // == Is Empty ==
    /// Returns true if no bucket holds an entry.
    pub fn is_empty(&self) -> bool {
        (0..self.buckets.len()).all(|i| self.read(i).is_empty())
    }

    /// Number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of entries held by bucket `index`.
    pub fn bucket_len(&self, index: usize) -> usize {
        self.read(index).len()
    }

    fn read(&self, index: usize) -> RwLockReadGuard<'_, HashMap<String, V>> {
        self.buckets[index]
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, index: usize) -> RwLockWriteGuard<'_, HashMap<String, V>> {
        self.buckets[index]
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
