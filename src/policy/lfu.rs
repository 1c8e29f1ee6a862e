//! Least Frequently Used (LFU) eviction engine with frequency aging.
//!
//! Entries live in per-frequency buckets ([`FrequencyBuckets`]); eviction
//! takes the oldest entry of the minimum-frequency bucket, so same-frequency
//! entries fall back to LRU-by-insertion.
//!
//! Pure LFU has a known pathology: an entry that was hot long ago keeps a
//! frequency no fresh competitor can reach, and the cache fossilizes. This
//! engine counters that with **aging**: it tracks the running total of
//! accesses, and whenever the average (`total / len`) climbs above the
//! configured `max_average`, every entry's count is rewritten to
//! `max(1, count - max_average / 2)` in one O(n) sweep and the minimum
//! frequency is recomputed. The divisor trades smoothness against
//! reactivity.
//!
//! The sweep runs under the engine's lock; with the default `max_average`
//! of 1,000,000 it is effectively disabled unless asked for.

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;

use crate::ds::freq_buckets::FrequencyBuckets;
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::{CacheMetrics, MetricsSnapshot};
use crate::traits::Cache;

/// Aging threshold used when none is given: high enough that aging never
/// triggers on realistic workloads.
pub const DEFAULT_MAX_AVERAGE: u64 = 1_000_000;

/// Single-threaded LFU core: frequency buckets + access accounting.
///
/// # Example
///
/// ```
/// use evictkit::policy::lfu::LfuCore;
///
/// let mut core = LfuCore::new(2);
/// core.insert(1, "a");
/// core.insert(2, "b");
/// core.get(&1);
/// core.get(&1);
/// core.insert(3, "c"); // evicts 2: frequency 1 vs 3 for key 1
///
/// assert!(core.contains(&1));
/// assert!(!core.contains(&2));
/// assert!(core.contains(&3));
/// ```
pub struct LfuCore<K, V> {
    entries: FrequencyBuckets<K, V>,
    capacity: usize,
    max_average: u64,
    total_accesses: u64,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a core with the default aging threshold.
    pub fn new(capacity: usize) -> Self {
        Self::with_max_average(capacity, DEFAULT_MAX_AVERAGE)
    }

    /// Creates a core that runs an aging sweep whenever the average access
    /// count exceeds `max_average`.
    pub fn with_max_average(capacity: usize, max_average: u64) -> Self {
        Self {
            entries: FrequencyBuckets::new(),
            capacity,
            max_average,
            total_accesses: 0,
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::default(),
        }
    }

    /// Inserts or overwrites; an overwrite also counts as an access.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.capacity == 0 {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_rejected();
            return None;
        }

        if self.entries.contains(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();
            let previous = self.entries.set_value(&key, value);
            self.entries.touch(&key);
            self.record_access();
            return previous;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_admission();

        if self.entries.len() >= self.capacity {
            self.evict();
        }
        self.entries.insert(key, value);
        self.record_access();
        None
    }

    /// Looks up `key`, bumping its frequency on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.entries.touch(key).is_none() {
            #[cfg(feature = "metrics")]
            self.metrics.record_miss();
            return None;
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_hit();
        self.record_access();
        self.entries.peek(key)
    }

    /// Read-only lookup; neither frequency nor accounting changes.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.peek(key)
    }

    /// Removes `key`, returning its value if present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (value, freq) = self.entries.remove(key)?;
        #[cfg(feature = "metrics")]
        self.metrics.record_removal();
        self.total_accesses = self.total_accesses.saturating_sub(freq);
        Some(value)
    }

    /// Returns the access frequency recorded for `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.entries.frequency(key)
    }

    /// Returns the smallest frequency present, or `None` when empty.
    pub fn min_frequency(&self) -> Option<u64> {
        self.entries.min_frequency()
    }

    /// Returns `true` if `key` is cached.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the configured aging threshold.
    pub fn max_average(&self) -> u64 {
        self.max_average
    }

    /// Drops all entries and resets the access accounting.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
        self.entries.clear();
        self.total_accesses = 0;
    }

    /// Evicts the oldest entry of the minimum-frequency bucket.
    fn evict(&mut self) {
        if let Some((_, _, freq)) = self.entries.pop_min() {
            #[cfg(feature = "metrics")]
            self.metrics.record_eviction();
            self.total_accesses = self.total_accesses.saturating_sub(freq);
        }
    }

    /// Books one access and runs an aging sweep if the average overshoots.
    fn record_access(&mut self) {
        self.total_accesses += 1;
        let len = self.entries.len() as u64;
        if len > 0 && self.total_accesses / len > self.max_average {
            self.age();
        }
    }

    /// Rewrites every access count to `max(1, count - max_average / 2)`.
    ///
    /// O(n) in the cache size. The running total is recomputed from the new
    /// counts, so the post-sweep average is consistent with what eviction
    /// decisions will see.
    fn age(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_aging_sweep();

        let decay = self.max_average / 2;
        let mut new_total = 0u64;
        for (key, value, freq) in self.entries.drain() {
            let aged = freq.saturating_sub(decay).max(1);
            new_total += aged;
            self.entries.restore(key, value, aged);
        }
        self.total_accesses = new_total;
    }

    /// Verifies bucket structure, capacity bound and accounting.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.entries.check_invariants()?;
        if self.entries.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.entries.len(),
                self.capacity
            )));
        }
        Ok(())
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.len(), self.capacity)
    }
}

impl<K, V> fmt::Debug for LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("min_frequency", &self.min_frequency())
            .field("total_accesses", &self.total_accesses)
            .finish_non_exhaustive()
    }
}

/// Thread-safe LFU cache.
///
/// # Example
///
/// ```
/// use evictkit::traits::Cache;
/// use evictkit::policy::lfu::LfuCache;
///
/// let cache = LfuCache::new(2);
/// cache.insert(1, "a");
/// cache.insert(2, "b");
/// cache.get(&1);
/// cache.insert(3, "c"); // evicts 2, the least frequently used
///
/// assert_eq!(cache.get(&2), None);
/// assert_eq!(cache.get(&1), Some("a"));
/// ```
pub struct LfuCache<K, V> {
    inner: Mutex<LfuCore<K, V>>,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache with the default aging threshold.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LfuCore::new(capacity)),
        }
    }

    /// Creates a cache that ages frequencies once the average access count
    /// exceeds `max_average`.
    pub fn with_max_average(capacity: usize, max_average: u64) -> Self {
        Self {
            inner: Mutex::new(LfuCore::with_max_average(capacity, max_average)),
        }
    }

    /// Returns the access frequency recorded for `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.inner.lock().frequency(key)
    }

    /// Returns the smallest frequency present, or `None` when empty.
    pub fn min_frequency(&self) -> Option<u64> {
        self.inner.lock().min_frequency()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

impl<K, V> Cache<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().insert(key, value)
    }

    fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    fn clear(&self) {
        self.inner.lock().clear();
    }

    fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    fn len(&self) -> usize {
        self.inner.lock().len()
    }

    fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }
}

impl<K, V> fmt::Debug for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LfuCache")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_starts_at_frequency_one() {
        let mut core = LfuCore::new(4);
        core.insert(1, "a");
        assert_eq!(core.frequency(&1), Some(1));
        assert_eq!(core.min_frequency(), Some(1));
        core.check_invariants().unwrap();
    }

    #[test]
    fn hits_bump_frequency() {
        let mut core = LfuCore::new(4);
        core.insert(1, "a");
        core.get(&1);
        core.get(&1);
        assert_eq!(core.frequency(&1), Some(3));
        assert_eq!(core.get(&9), None);
        core.check_invariants().unwrap();
    }

    #[test]
    fn overwrite_bumps_frequency() {
        let mut core = LfuCore::new(4);
        core.insert(1, "a");
        assert_eq!(core.insert(1, "a2"), Some("a"));
        assert_eq!(core.frequency(&1), Some(2));
        assert_eq!(core.peek(&1), Some(&"a2"));
    }

    #[test]
    fn eviction_takes_least_frequent() {
        let mut core = LfuCore::new(2);
        core.insert(1, "a");
        core.insert(2, "b");
        core.get(&1);
        core.get(&1);

        core.insert(3, "c"); // 2 has the minimum frequency
        assert!(!core.contains(&2));
        assert!(core.contains(&1));
        assert!(core.contains(&3));
        core.check_invariants().unwrap();
    }

    #[test]
    fn frequency_ties_break_by_insertion_age() {
        let mut core = LfuCore::new(3);
        core.insert(1, "a");
        core.insert(2, "b");
        core.insert(3, "c");
        // All at frequency 1: the oldest admission (1) is the victim.
        core.insert(4, "d");
        assert!(!core.contains(&1));
        assert!(core.contains(&2));
        core.check_invariants().unwrap();
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let mut core = LfuCore::new(0);
        assert_eq!(core.insert(1, "a"), None);
        assert_eq!(core.get(&1), None);
        assert!(core.is_empty());
        core.check_invariants().unwrap();
    }

    #[test]
    fn remove_adjusts_accounting() {
        let mut core = LfuCore::with_max_average(4, 10);
        core.insert(1, "a");
        core.get(&1);
        assert_eq!(core.remove(&1), Some("a"));
        assert_eq!(core.remove(&1), None);
        assert_eq!(core.total_accesses, 0);
        core.check_invariants().unwrap();
    }

    #[test]
    fn aging_halves_heavy_counts() {
        let mut core = LfuCore::with_max_average(4, 10);
        for key in 1..=4 {
            core.insert(key, key);
        }
        // Concentrate accesses on key 1 until the average trips the sweep.
        for _ in 0..50 {
            core.get(&1);
        }

        // No count may reach zero, and the hot key must have been decayed
        // by max_average / 2 at least once.
        for key in 1..=4 {
            let freq = core.frequency(&key).unwrap();
            assert!(freq >= 1);
        }
        assert!(core.frequency(&1).unwrap() < 50);
        assert_eq!(core.min_frequency(), Some(1));

        // Post-sweep accounting keeps the average at or below the threshold.
        let len = core.len() as u64;
        assert!(core.total_accesses / len <= core.max_average());
        core.check_invariants().unwrap();
    }

    #[test]
    fn aging_resets_min_frequency() {
        let mut core = LfuCore::with_max_average(2, 4);
        core.insert(1, "a");
        core.insert(2, "b");
        for _ in 0..12 {
            core.get(&1);
        }
        // Sweep ran at least once; the cold key clamps at 1 and the
        // minimum points at a populated bucket.
        let min = core.min_frequency().unwrap();
        assert!(core.frequency(&2).unwrap() >= 1);
        assert_eq!(min, core.frequency(&2).unwrap().min(core.frequency(&1).unwrap()));
        core.check_invariants().unwrap();
    }

    #[test]
    fn clear_resets_accounting() {
        let mut core = LfuCore::with_max_average(4, 10);
        core.insert(1, "a");
        core.get(&1);
        core.clear();
        assert!(core.is_empty());
        assert_eq!(core.total_accesses, 0);
        assert_eq!(core.min_frequency(), None);

        core.insert(2, "b");
        assert_eq!(core.frequency(&2), Some(1));
        core.check_invariants().unwrap();
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn metrics_count_aging_sweeps() {
        let mut core = LfuCore::with_max_average(2, 3);
        core.insert(1, "a");
        core.insert(2, "b");
        for _ in 0..20 {
            core.get(&1);
        }
        let snap = core.metrics_snapshot();
        assert!(snap.aging_sweeps >= 1);
        assert_eq!(snap.get_hits, 20);
    }
}
