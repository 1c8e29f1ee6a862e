//! LRU-K eviction engine: admission only after K observations.
//!
//! A plain LRU is vulnerable to one-shot scans: every touched key lands in
//! the cache and displaces the working set. LRU-K admits a key into the main
//! cache only once it has been observed K times, tracking pending keys in a
//! bounded observation history:
//!
//! ```text
//!   ┌───────────────────────────┐        count >= K        ┌──────────────┐
//!   │ history: LruCore<K, u64>  │ ───────promotes────────► │  main LRU    │
//!   │ (observation counts)      │                          │ (K, V)       │
//!   └───────────────────────────┘                          └──────────────┘
//!   ┌───────────────────────────┐
//!   │ staging: FxHashMap<K, V>  │  latest value seen for keys still waiting
//!   └───────────────────────────┘
//! ```
//!
//! The history is itself an LRU of bounded capacity, so keys that never reach
//! K observations age out instead of accumulating; when a key falls out of
//! history its staged value is dropped in the same step. That makes the
//! admission filter probabilistic on long-tailed workloads, which is the
//! point of the policy.
//!
//! Unlike the other engines, a lookup miss mutates state here: misses are
//! exactly the observations the admission filter counts.

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::{CacheMetrics, MetricsSnapshot};
use crate::policy::lru::LruCore;
use crate::traits::Cache;

/// Single-threaded LRU-K core: main LRU + observation history + staging map.
///
/// # Example
///
/// ```
/// use evictkit::policy::lru_k::LruKCore;
///
/// let mut core = LruKCore::with_k(4, 4, 2);
/// core.insert(1, "a");          // first observation: staged, not cached
/// assert!(!core.contains(&1));
/// core.insert(1, "a2");         // second observation: promoted
/// assert_eq!(core.get(&1), Some("a2"));
/// ```
pub struct LruKCore<K, V> {
    main: LruCore<K, V>,
    history: LruCore<K, u64>,
    staging: FxHashMap<K, V>,
    k: u64,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> LruKCore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a core with the given main capacity, history capacity and
    /// promotion threshold `k` (clamped to at least 1).
    ///
    /// With `k = 1` every observation promotes immediately and the engine
    /// degenerates to plain LRU.
    pub fn with_k(capacity: usize, history_capacity: usize, k: usize) -> Self {
        Self {
            main: LruCore::new(capacity),
            history: LruCore::new(history_capacity),
            staging: FxHashMap::default(),
            k: k.max(1) as u64,
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::default(),
        }
    }

    /// Inserts or overwrites.
    ///
    /// A key already in the main cache is overwritten and touched. Any other
    /// key is counted as observed once more and its value staged; reaching K
    /// observations promotes it into the main cache.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.main.contains(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();
            return self.main.insert(key, value);
        }

        if self.main.capacity() == 0 {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_rejected();
            return None;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_admission();

        let count = self.observe(&key);
        if count >= self.k {
            self.history.remove(&key);
            self.staging.remove(&key);
            #[cfg(feature = "metrics")]
            self.metrics.record_promotion();
            self.main.insert(key, value);
        } else {
            self.staging.insert(key, value);
        }
        None
    }

    /// Looks up `key`.
    ///
    /// A main-cache hit behaves like plain LRU. A miss counts as an
    /// observation; if that observation reaches K and a staged value exists,
    /// the key is promoted and the staged value returned.
    pub fn get(&mut self, key: &K) -> Option<V> {
        if let Some(value) = self.main.get(key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_hit();
            return Some(value.clone());
        }

        if self.main.capacity() == 0 {
            #[cfg(feature = "metrics")]
            self.metrics.record_miss();
            return None;
        }

        let count = self.observe(key);
        if count >= self.k {
            if let Some(value) = self.staging.remove(key) {
                self.history.remove(key);
                #[cfg(feature = "metrics")]
                self.metrics.record_promotion();
                self.main.insert(key.clone(), value.clone());
                #[cfg(feature = "metrics")]
                self.metrics.record_hit();
                return Some(value);
            }
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_miss();
        None
    }

    /// Removes `key` from the main cache and from the admission filter.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.history.remove(key);
        self.staging.remove(key);
        let removed = self.main.remove(key);
        #[cfg(feature = "metrics")]
        if removed.is_some() {
            self.metrics.record_removal();
        }
        removed
    }

    /// Returns `true` if `key` is in the main cache (staged keys are not
    /// cached yet).
    pub fn contains(&self, key: &K) -> bool {
        self.main.contains(key)
    }

    /// Returns the number of entries in the main cache.
    pub fn len(&self) -> usize {
        self.main.len()
    }

    /// Returns `true` if the main cache is empty.
    pub fn is_empty(&self) -> bool {
        self.main.is_empty()
    }

    /// Returns the main-cache capacity.
    pub fn capacity(&self) -> usize {
        self.main.capacity()
    }

    /// Returns the promotion threshold.
    pub fn k_value(&self) -> usize {
        self.k as usize
    }

    /// Returns the number of keys currently tracked in the history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Drops the main cache, the history and every staged value.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
        self.main.clear();
        self.history.clear();
        self.staging.clear();
    }

    /// Records one observation of `key` and returns the updated count.
    ///
    /// When the history is full and must evict to make room, the evicted
    /// key's staged value is dropped with it.
    fn observe(&mut self, key: &K) -> u64 {
        let count = self.history.peek(key).copied().unwrap_or(0) + 1;
        if count == 1
            && self.history.capacity() > 0
            && self.history.len() >= self.history.capacity()
        {
            if let Some((aged_out, _)) = self.history.pop_lru() {
                self.staging.remove(&aged_out);
            }
        }
        self.history.insert(key.clone(), count);
        count
    }

    /// Verifies the coupling between main cache, history and staging.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.main.check_invariants()?;
        self.history.check_invariants()?;

        for key in self.staging.keys() {
            if !self.history.contains(key) {
                return Err(InvariantError::new("staged key missing from history"));
            }
            if self.main.contains(key) {
                return Err(InvariantError::new("staged key already promoted"));
            }
        }
        Ok(())
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.len(), self.capacity())
    }
}

impl<K, V> fmt::Debug for LruKCore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruKCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("history_len", &self.history_len())
            .field("k", &self.k)
            .finish_non_exhaustive()
    }
}

/// Thread-safe LRU-K cache.
///
/// # Example
///
/// ```
/// use evictkit::traits::Cache;
/// use evictkit::policy::lru_k::LruKCache;
///
/// let cache = LruKCache::with_k(3, 3, 2);
/// cache.insert(1, "a");
/// cache.insert(2, "b");
/// cache.insert(1, "a2"); // second observation of 1: admitted
///
/// assert_eq!(cache.get(&1), Some("a2"));
/// assert!(!cache.contains(&2)); // observed once, still staged
/// ```
pub struct LruKCache<K, V> {
    inner: Mutex<LruKCore<K, V>>,
}

impl<K, V> LruKCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a cache with the given main capacity, history capacity and
    /// promotion threshold `k`.
    pub fn with_k(capacity: usize, history_capacity: usize, k: usize) -> Self {
        Self {
            inner: Mutex::new(LruKCore::with_k(capacity, history_capacity, k)),
        }
    }

    /// Returns the promotion threshold.
    pub fn k_value(&self) -> usize {
        self.inner.lock().k_value()
    }

    /// Returns the number of keys tracked by the admission history.
    pub fn history_len(&self) -> usize {
        self.inner.lock().history_len()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

impl<K, V> Cache<K, V> for LruKCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().insert(key, value)
    }

    fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key)
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

impl<K, V> fmt::Debug for LruKCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LruKCache")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .field("k", &core.k)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_stages_without_caching() {
        let mut core = LruKCore::with_k(4, 4, 2);
        core.insert(1, "a");
        assert!(!core.contains(&1));
        assert_eq!(core.len(), 0);
        assert_eq!(core.history_len(), 1);
        core.check_invariants().unwrap();
    }

    #[test]
    fn second_observation_promotes() {
        let mut core = LruKCore::with_k(4, 4, 2);
        core.insert(1, "a");
        core.insert(1, "a2");
        assert!(core.contains(&1));
        assert_eq!(core.get(&1), Some("a2"));
        assert_eq!(core.history_len(), 0);
        core.check_invariants().unwrap();
    }

    #[test]
    fn lookup_observation_promotes_staged_value() {
        let mut core = LruKCore::with_k(4, 4, 2);
        core.insert(1, "a"); // observation 1, staged
        // Observation 2 arrives via lookup; the staged value is admitted
        // and returned.
        assert_eq!(core.get(&1), Some("a"));
        assert!(core.contains(&1));
        core.check_invariants().unwrap();
    }

    #[test]
    fn lookup_miss_without_staged_value_stays_absent() {
        let mut core: LruKCore<u32, String> = LruKCore::with_k(4, 4, 2);
        assert_eq!(core.get(&7), None);
        assert_eq!(core.get(&7), None); // count reaches 2 but nothing staged
        assert!(!core.contains(&7));
        // The next insert sees an already-satisfied threshold and promotes.
        core.insert(7, "v".to_string());
        assert!(core.contains(&7));
        core.check_invariants().unwrap();
    }

    #[test]
    fn history_eviction_drops_staged_value() {
        let mut core = LruKCore::with_k(4, 2, 2);
        core.insert(1, "a");
        core.insert(2, "b");
        core.insert(3, "c"); // history is full: key 1 ages out, stage dropped

        assert_eq!(core.history_len(), 2);
        // Key 1 starts over: this is observation 1 again, not 2.
        core.insert(1, "a2");
        assert!(!core.contains(&1));
        core.check_invariants().unwrap();
    }

    #[test]
    fn k_equal_one_degenerates_to_lru() {
        let mut core = LruKCore::with_k(2, 4, 1);
        core.insert(1, "a");
        core.insert(2, "b");
        assert!(core.contains(&1));
        assert!(core.contains(&2));

        core.insert(3, "c"); // plain LRU eviction of 1
        assert!(!core.contains(&1));
        assert_eq!(core.history_len(), 0);
        core.check_invariants().unwrap();
    }

    #[test]
    fn k_zero_is_clamped() {
        let core: LruKCore<u32, u32> = LruKCore::with_k(2, 2, 0);
        assert_eq!(core.k_value(), 1);
    }

    #[test]
    fn staged_overwrite_keeps_latest_value() {
        let mut core = LruKCore::with_k(4, 4, 3);
        core.insert(1, "v1");
        core.insert(1, "v2");
        core.insert(1, "v3"); // third observation promotes the latest value
        assert_eq!(core.get(&1), Some("v3"));
    }

    #[test]
    fn remove_clears_admission_state() {
        let mut core = LruKCore::with_k(4, 4, 2);
        core.insert(1, "a");
        assert_eq!(core.remove(&1), None); // staged only, nothing cached
        assert_eq!(core.history_len(), 0);

        core.insert(2, "b");
        core.insert(2, "b2");
        assert_eq!(core.remove(&2), Some("b2"));
        assert!(!core.contains(&2));
        core.check_invariants().unwrap();
    }

    #[test]
    fn zero_capacity_is_a_no_op() {
        let mut core = LruKCore::with_k(0, 4, 2);
        core.insert(1, "a");
        core.insert(1, "a");
        assert!(core.is_empty());
        assert_eq!(core.history_len(), 0);
        assert_eq!(core.get(&1), None);
    }

    #[test]
    fn zero_history_capacity_never_promotes_for_k_above_one() {
        let mut core = LruKCore::with_k(4, 0, 2);
        for _ in 0..10 {
            core.insert(1, "a");
        }
        assert!(!core.contains(&1));
        core.check_invariants().unwrap();
    }

    #[test]
    fn clear_resets_all_three_structures() {
        let mut core = LruKCore::with_k(4, 4, 2);
        core.insert(1, "a");
        core.insert(1, "a2"); // promoted
        core.insert(2, "b"); // staged
        core.clear();

        assert!(core.is_empty());
        assert_eq!(core.history_len(), 0);
        assert_eq!(core.get(&1), None);
        core.check_invariants().unwrap();
    }

    #[test]
    fn main_eviction_follows_lru_order() {
        let mut core = LruKCore::with_k(2, 8, 2);
        for key in [1, 2, 3] {
            core.insert(key, key);
            core.insert(key, key); // promote each
        }
        // Main capacity is 2: key 1 was the least recent of the promoted.
        assert!(!core.contains(&1));
        assert!(core.contains(&2));
        assert!(core.contains(&3));
        core.check_invariants().unwrap();
    }
}
