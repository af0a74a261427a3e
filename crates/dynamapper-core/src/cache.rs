//! Bounded access-order cache for type metadata
//!
//! The introspector and the strategy resolver keep their derived metadata in
//! [`BoundedMetadataCache`] so a type is only walked once while it stays hot.
//! Eviction is purely capacity driven: once full, inserting a new key drops the
//! entry that has gone longest without a `get` or `put`.
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a shared cache. A poisoned lock is recovered since a cache only
/// holds metadata that can be derived again.
pub(crate) fn lock_cache<T>(cache: &Mutex<T>) -> MutexGuard<'_, T> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct Slot<V> {
    value: V,
    stamp: u64,
}

/// Fixed-capacity least-recently-used cache
///
/// Not synchronized; owners that share it across threads keep it behind a lock.
#[derive(Debug)]
pub struct BoundedMetadataCache<K, V> {
    entries: HashMap<K, Slot<V>>,
    // stamp -> key, oldest first
    recency: BTreeMap<u64, K>,
    capacity: usize,
    clock: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K, V> BoundedMetadataCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero disables caching: `put` becomes a no-op.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(1024)),
            recency: BTreeMap::new(),
            capacity,
            clock: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Look up an entry, refreshing its recency on a hit
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let stamp = self.next_stamp();
        match self.entries.get_mut(key) {
            Some(slot) => {
                let previous = std::mem::replace(&mut slot.stamp, stamp);
                if let Some(owned_key) = self.recency.remove(&previous) {
                    self.recency.insert(stamp, owned_key);
                }
                self.hits += 1;
                Some(&slot.value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert or replace an entry, evicting the eldest one if the cache is full
    pub fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        let stamp = self.next_stamp();
        if let Some(slot) = self.entries.get_mut(&key) {
            let previous = std::mem::replace(&mut slot.stamp, stamp);
            slot.value = value;
            self.recency.remove(&previous);
            self.recency.insert(stamp, key);
            return;
        }

        if self.entries.len() >= self.capacity {
            self.evict_eldest();
        }

        self.recency.insert(stamp, key.clone());
        self.entries.insert(key, Slot { value, stamp });
    }

    /// Check for a key without counting it as an access
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Remove a specific entry
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.entries.remove(key)?;
        self.recency.remove(&slot.stamp);
        Some(slot.value)
    }

    /// Clear all entries. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys ordered from least to most recently used
    pub fn keys_by_recency(&self) -> Vec<&K> {
        self.recency.values().collect()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            max_entries: self.capacity,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }

    fn next_stamp(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_eldest(&mut self) {
        if let Some((_, eldest)) = self.recency.pop_first() {
            self.entries.remove(&eldest);
            self.evictions += 1;
        }
    }
}

/// Cache statistics for monitoring and debugging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub max_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate cache utilization as a percentage
    pub fn utilization(&self) -> f64 {
        if self.max_entries == 0 {
            0.0
        } else {
            (self.total_entries as f64 / self.max_entries as f64) * 100.0
        }
    }

    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }

    /// Check if cache is nearly full
    pub fn is_nearly_full(&self) -> bool {
        self.utilization() > 90.0
    }

    /// Sum two snapshots, used to report several caches as one
    pub fn combine(self, other: CacheStats) -> CacheStats {
        CacheStats {
            total_entries: self.total_entries + other.total_entries,
            max_entries: self.max_entries + other.max_entries,
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
            evictions: self.evictions + other.evictions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_refreshes_recency_before_eviction() {
        let mut cache = BoundedMetadataCache::new(4);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c");
        cache.put(4, "d");

        // Touch the eldest so it outlives 2 and 3
        assert_eq!(cache.get(&1), Some(&"a"));

        cache.put(5, "e");
        cache.put(6, "f");

        assert_eq!(cache.get(&1), Some(&"a"));
        assert!(!cache.contains(&2));
        assert!(!cache.contains(&3));
        assert!(cache.contains(&4));
        assert!(cache.contains(&5));
        assert!(cache.contains(&6));
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_overflow_evicts_first_inserted() {
        let capacity = 8;
        let mut cache = BoundedMetadataCache::new(capacity);
        for key in 0..=capacity {
            cache.put(key, key * 10);
        }

        assert!(!cache.contains(&0));
        for key in 1..=capacity {
            assert!(cache.contains(&key), "key {} should survive", key);
        }
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_replacing_existing_key_does_not_evict() {
        let mut cache = BoundedMetadataCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("a", 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(&3));
        // "a" was refreshed by the second put, so "b" is now eldest
        cache.put("c", 4);
        assert!(!cache.contains("b"));
        assert!(cache.contains("a"));
    }

    #[test]
    fn test_contains_is_not_an_access() {
        let mut cache = BoundedMetadataCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert!(cache.contains("a"));
        cache.put("c", 3);
        assert!(!cache.contains("a"));
    }

    #[test]
    fn test_get_never_evicts() {
        let mut cache = BoundedMetadataCache::new(1);
        cache.put("only", 1);
        assert_eq!(cache.get("missing"), None);
        assert_eq!(cache.get("only"), Some(&1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let mut cache = BoundedMetadataCache::new(0);
        cache.put("a", 1);
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cache = BoundedMetadataCache::new(3);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.remove("a"), Some(1));
        assert_eq!(cache.remove("a"), None);
        assert_eq!(cache.keys_by_recency(), vec![&"b"]);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.keys_by_recency().is_empty());
    }

    #[test]
    fn test_cache_stats() {
        let mut cache = BoundedMetadataCache::new(10);
        cache.put("a", 1);
        cache.get("a");
        cache.get("b");

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.max_entries, 10);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 0.5);
        assert_eq!(stats.utilization(), 10.0);
        assert!(!stats.is_nearly_full());
    }
}
