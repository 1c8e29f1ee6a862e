//! Adaptive Replacement Cache (ARC) eviction engine.
//!
//! Two sub-caches with separately adjustable capacity shares, each shadowed
//! by a ghost list of its recent evictions:
//!
//! ```text
//!   ┌──────────────────────────┐   count reaches    ┌──────────────────────────┐
//!   │ T1: recency half (LRU)   │ ────threshold────► │ T2: frequency half (LFU) │
//!   │  admissions land here    │    (default 3)     │  count restarts at 1     │
//!   └────────────┬─────────────┘                    └────────────┬─────────────┘
//!          evicts│to                                       evicts│to
//!   ┌────────────▼─────────────┐                    ┌────────────▼─────────────┐
//!   │ B1: ghost of T1 (keys)   │                    │ B2: ghost of T2 (keys)   │
//!   └──────────────────────────┘                    └──────────────────────────┘
//! ```
//!
//! The adaptive feedback runs on insert: a miss whose key is found in B1
//! means a useful *recent* key was evicted too early, so the recency half's
//! share grows at the frequency half's expense; a hit in B2 argues the
//! converse. Each ghost hit shifts one unit of share and consumes the ghost
//! record. Lookups never consult the ghosts.
//!
//! Both halves start with a share equal to the full configured capacity and
//! each ghost holds up to the configured capacity, so the engine may retain
//! up to twice the configured capacity in live entries across its halves;
//! each half honors its own share bound at all times.

mod frequency;
mod recency;

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;

use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::{CacheMetrics, MetricsSnapshot};
use crate::traits::Cache;

use frequency::FrequencyPart;
use recency::{RecencyHit, RecencyPart};

/// Accesses required before a recency-half entry migrates to the frequency
/// half.
pub const DEFAULT_PROMOTION_THRESHOLD: u64 = 3;

/// Single-threaded ARC core: the two halves plus the adaptation rule.
///
/// # Example
///
/// ```
/// use evictkit::policy::arc::ArcCore;
///
/// let mut core = ArcCore::new(4);
/// core.insert(1, "a"); // lands in the recency half
/// core.get(&1);
/// core.get(&1);        // third access: promoted to the frequency half
///
/// assert_eq!(core.frequency_len(), 1);
/// assert_eq!(core.recency_len(), 0);
/// ```
pub struct ArcCore<K, V> {
    recency: RecencyPart<K, V>,
    frequency: FrequencyPart<K, V>,
    capacity: usize,
    threshold: u64,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> ArcCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a core with the default promotion threshold.
    pub fn new(capacity: usize) -> Self {
        Self::with_threshold(capacity, DEFAULT_PROMOTION_THRESHOLD)
    }

    /// Creates a core that promotes after `threshold` accesses (clamped to
    /// at least 1).
    pub fn with_threshold(capacity: usize, threshold: u64) -> Self {
        let threshold = threshold.max(1);
        Self {
            recency: RecencyPart::new(capacity, capacity, threshold),
            frequency: FrequencyPart::new(capacity, capacity),
            capacity,
            threshold,
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::default(),
        }
    }

    /// Inserts or overwrites.
    ///
    /// Consults the ghosts first: a B1 hit shifts one unit of share from the
    /// frequency half to the recency half (a B2 hit the converse), consuming
    /// the ghost record. A key living in the frequency half is updated
    /// there; everything else routes to the recency half, which may promote
    /// the entry on this very touch.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.capacity == 0 {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_rejected();
            return None;
        }

        self.adapt(&key);

        if self.frequency.contains(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();
            return self.frequency.update(&key, value);
        }

        #[cfg(feature = "metrics")]
        if self.recency.contains(&key) {
            self.metrics.record_insert_update();
        } else {
            self.metrics.record_insert_admission();
        }

        let may_promote = self.frequency.share() > 0;
        let (previous, promoted) = self.recency.put(key, value, may_promote);
        if let Some((key, value)) = promoted {
            #[cfg(feature = "metrics")]
            self.metrics.record_promotion();
            self.frequency.admit(key, value);
        }
        previous
    }

    /// Looks up `key`.
    ///
    /// A recency-half hit bumps the access count (possibly promoting the
    /// entry); a frequency-half hit bumps its frequency. Misses do not
    /// consult the ghosts; ghosts only steer admission sizing.
    pub fn get(&mut self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let may_promote = self.frequency.share() > 0;
        if let Some(hit) = self.recency.get(key, may_promote) {
            #[cfg(feature = "metrics")]
            self.metrics.record_hit();
            return Some(match hit {
                RecencyHit::Retained(value) => value,
                RecencyHit::Promoted(key, value) => {
                    #[cfg(feature = "metrics")]
                    self.metrics.record_promotion();
                    let copy = value.clone();
                    self.frequency.admit(key, value);
                    copy
                },
            });
        }

        let hit = self.frequency.get(key).cloned();
        #[cfg(feature = "metrics")]
        if hit.is_some() {
            self.metrics.record_hit();
        } else {
            self.metrics.record_miss();
        }
        hit
    }

    /// Removes `key` from whichever half holds it.
    ///
    /// Ghost records are left alone; they carry no value and at worst bias
    /// one future sizing decision.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = self
            .recency
            .remove(key)
            .or_else(|| self.frequency.remove(key));
        #[cfg(feature = "metrics")]
        if removed.is_some() {
            self.metrics.record_removal();
        }
        removed
    }

    /// Returns `true` if `key` is in either half.
    pub fn contains(&self, key: &K) -> bool {
        self.recency.contains(key) || self.frequency.contains(key)
    }

    /// Returns the number of live entries across both halves.
    pub fn len(&self) -> usize {
        self.recency.len() + self.frequency.len()
    }

    /// Returns `true` if both halves are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the configured capacity (each half's initial share).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the promotion threshold.
    pub fn promotion_threshold(&self) -> u64 {
        self.threshold
    }

    /// Returns the number of entries in the recency half (T1).
    pub fn recency_len(&self) -> usize {
        self.recency.len()
    }

    /// Returns the number of entries in the frequency half (T2).
    pub fn frequency_len(&self) -> usize {
        self.frequency.len()
    }

    /// Returns the recency half's current capacity share.
    pub fn recency_share(&self) -> usize {
        self.recency.share()
    }

    /// Returns the frequency half's current capacity share.
    pub fn frequency_share(&self) -> usize {
        self.frequency.share()
    }

    /// Returns the number of keys ghosted from the recency half (B1).
    pub fn recency_ghost_len(&self) -> usize {
        self.recency.ghost_len()
    }

    /// Returns the number of keys ghosted from the frequency half (B2).
    pub fn frequency_ghost_len(&self) -> usize {
        self.frequency.ghost_len()
    }

    /// Drops all entries, ghosts and share adjustments; capacity and
    /// threshold are preserved.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        let metrics = {
            let mut m = self.metrics;
            m.record_clear();
            m
        };
        *self = Self::with_threshold(self.capacity, self.threshold);
        #[cfg(feature = "metrics")]
        {
            self.metrics = metrics;
        }
    }

    /// Shifts one unit of capacity share on a ghost hit.
    fn adapt(&mut self, key: &K) {
        if self.recency.take_ghost(key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_ghost_hit();
            if self.frequency.shrink() {
                self.recency.grow();
            }
        } else if self.frequency.take_ghost(key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_ghost_hit();
            if self.recency.shrink() {
                self.frequency.grow();
            }
        }
    }

    /// Verifies both halves plus the cross-half disjointness of
    /// {T1, T2, B1, B2}.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.recency.check_invariants()?;
        self.frequency.check_invariants()?;

        if self.recency.share() + self.frequency.share() != self.capacity * 2 {
            return Err(InvariantError::new(format!(
                "shares {} + {} no longer sum to twice the capacity {}",
                self.recency.share(),
                self.frequency.share(),
                self.capacity
            )));
        }

        for key in self.recency.keys() {
            if self.frequency.contains(key)
                || self.frequency.ghost_contains(key)
                || self.recency.ghost_contains(key)
            {
                return Err(InvariantError::new("key present in more than one set"));
            }
        }
        for key in self.frequency.keys() {
            if self.recency.ghost_contains(key) || self.frequency.ghost_contains(key) {
                return Err(InvariantError::new("key present in more than one set"));
            }
        }
        for key in self.recency.ghost_keys() {
            if self.frequency.ghost_contains(key) {
                return Err(InvariantError::new("key ghosted by both halves"));
            }
        }
        Ok(())
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.len(), self.capacity)
    }
}

impl<K, V> fmt::Debug for ArcCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArcCore")
            .field("capacity", &self.capacity)
            .field("recency_len", &self.recency.len())
            .field("frequency_len", &self.frequency.len())
            .field("recency_share", &self.recency.share())
            .field("frequency_share", &self.frequency.share())
            .field("recency_ghost_len", &self.recency.ghost_len())
            .field("frequency_ghost_len", &self.frequency.ghost_len())
            .finish_non_exhaustive()
    }
}

/// Thread-safe adaptive replacement cache.
///
/// # Example
///
/// ```
/// use evictkit::traits::Cache;
/// use evictkit::policy::arc::ArcCache;
///
/// let cache = ArcCache::new(8);
/// cache.insert("page", 1);
/// assert_eq!(cache.get(&"page"), Some(1));
/// ```
pub struct ArcCache<K, V> {
    inner: Mutex<ArcCore<K, V>>,
}

impl<K, V> ArcCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache with the default promotion threshold.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(ArcCore::new(capacity)),
        }
    }

    /// Creates a cache that promotes after `threshold` accesses.
    pub fn with_threshold(capacity: usize, threshold: u64) -> Self {
        Self {
            inner: Mutex::new(ArcCore::with_threshold(capacity, threshold)),
        }
    }

    /// Returns the current capacity shares of (recency, frequency) halves.
    pub fn shares(&self) -> (usize, usize) {
        let core = self.inner.lock();
        (core.recency_share(), core.frequency_share())
    }

    /// Returns the live entry counts of the (recency, frequency) halves.
    pub fn half_lens(&self) -> (usize, usize) {
        let core = self.inner.lock();
        (core.recency_len(), core.frequency_len())
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

impl<K, V> Cache<K, V> for ArcCache<K, V>
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

impl<K, V> fmt::Debug for ArcCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.lock().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admissions_land_in_recency_half() {
        let mut core = ArcCore::new(4);
        core.insert(1, "a");
        core.insert(2, "b");
        assert_eq!(core.recency_len(), 2);
        assert_eq!(core.frequency_len(), 0);
        assert_eq!(core.len(), 2);
        core.check_invariants().unwrap();
    }

    #[test]
    fn third_access_promotes_to_frequency_half() {
        let mut core = ArcCore::new(4);
        core.insert(1, "a"); // access 1
        assert_eq!(core.get(&1), Some("a")); // access 2
        assert_eq!(core.recency_len(), 1);

        assert_eq!(core.get(&1), Some("a")); // access 3: promoted
        assert_eq!(core.recency_len(), 0);
        assert_eq!(core.frequency_len(), 1);

        // Frequency-half hits stay there.
        assert_eq!(core.get(&1), Some("a"));
        assert_eq!(core.frequency_len(), 1);
        core.check_invariants().unwrap();
    }

    #[test]
    fn overwrite_counts_as_touch() {
        let mut core = ArcCore::new(4);
        core.insert(1, "a");
        assert_eq!(core.insert(1, "b"), Some("a")); // access 2
        assert_eq!(core.insert(1, "c"), Some("b")); // access 3: promoted
        assert_eq!(core.recency_len(), 0);
        assert_eq!(core.frequency_len(), 1);
        assert_eq!(core.get(&1), Some("c"));
        core.check_invariants().unwrap();
    }

    #[test]
    fn recency_eviction_feeds_ghost() {
        let mut core = ArcCore::new(2);
        core.insert(1, "a");
        core.insert(2, "b");
        core.insert(3, "c"); // T1 full: evicts 1 into B1

        assert!(!core.contains(&1));
        assert_eq!(core.recency_ghost_len(), 1);
        assert_eq!(core.len(), 2);
        core.check_invariants().unwrap();
    }

    #[test]
    fn ghost_hit_shifts_share_toward_recency() {
        let mut core = ArcCore::new(2);
        core.insert(1, "a");
        core.insert(2, "b");
        core.insert(3, "c"); // 1 falls into B1
        let (recency_before, frequency_before) = (core.recency_share(), core.frequency_share());

        core.insert(1, "a2"); // B1 hit: grow T1 share, shrink T2 share
        assert_eq!(core.recency_share(), recency_before + 1);
        assert_eq!(core.frequency_share(), frequency_before - 1);
        // The ghost record was consumed, and the grown share admits the key
        // without another eviction.
        assert_eq!(core.recency_ghost_len(), 0);
        assert!(core.contains(&1));
        assert_eq!(core.len(), 3);
        core.check_invariants().unwrap();
    }

    #[test]
    fn frequency_ghost_hit_shifts_share_back() {
        let mut core = ArcCore::with_threshold(1, 2);
        // Promote 1 into the frequency half (threshold 2).
        core.insert(1, "a");
        core.get(&1);
        assert_eq!(core.frequency_len(), 1);

        // Promote 2 as well; the frequency half has share 1, so 1 is
        // evicted into B2.
        core.insert(2, "b");
        core.get(&2);
        assert_eq!(core.frequency_ghost_len(), 1);

        let (recency_before, frequency_before) = (core.recency_share(), core.frequency_share());
        core.insert(1, "back"); // B2 hit
        assert_eq!(core.frequency_share(), frequency_before + 1);
        assert_eq!(core.recency_share(), recency_before - 1);
        core.check_invariants().unwrap();
    }

    #[test]
    fn frequency_half_evicts_least_frequent() {
        let mut core = ArcCore::with_threshold(2, 2);
        // Promote 1 and 2 (two accesses each), then make 1 clearly hotter.
        core.insert(1, "a");
        core.get(&1);
        core.insert(2, "b");
        core.get(&2);
        core.get(&1);
        core.get(&1);
        assert_eq!(core.frequency_len(), 2);

        // Promote a third key; T2 share is 2, so its least frequent (2)
        // is evicted into B2.
        core.insert(3, "c");
        core.get(&3);
        assert!(core.contains(&1));
        assert!(!core.contains(&2));
        assert_eq!(core.frequency_ghost_len(), 1);
        core.check_invariants().unwrap();
    }

    #[test]
    fn promotion_resets_count_in_frequency_half() {
        let mut core = ArcCore::with_threshold(4, 2);
        core.insert(1, "a");
        core.get(&1); // promoted at access 2
        assert_eq!(core.inner_frequency(&1), Some(1));

        core.get(&1);
        assert_eq!(core.inner_frequency(&1), Some(2));
    }

    #[test]
    fn lookup_miss_does_not_consult_ghosts() {
        let mut core = ArcCore::new(2);
        core.insert(1, "a");
        core.insert(2, "b");
        core.insert(3, "c"); // 1 ghosted
        let shares = (core.recency_share(), core.frequency_share());

        assert_eq!(core.get(&1), None); // miss; no adaptation
        assert_eq!(
            (core.recency_share(), core.frequency_share()),
            shares
        );
        assert_eq!(core.recency_ghost_len(), 1);
        core.check_invariants().unwrap();
    }

    #[test]
    fn remove_works_across_halves() {
        let mut core = ArcCore::with_threshold(4, 2);
        core.insert(1, "a");
        core.insert(2, "b");
        core.get(&2); // promote 2

        assert_eq!(core.remove(&1), Some("a"));
        assert_eq!(core.remove(&2), Some("b"));
        assert_eq!(core.remove(&3), None);
        assert!(core.is_empty());
        core.check_invariants().unwrap();
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let mut core = ArcCore::new(0);
        assert_eq!(core.insert(1, "a"), None);
        assert_eq!(core.get(&1), None);
        assert!(core.is_empty());
        core.check_invariants().unwrap();
    }

    #[test]
    fn clear_restores_initial_shares() {
        let mut core = ArcCore::new(2);
        core.insert(1, "a");
        core.insert(2, "b");
        core.insert(3, "c");
        core.insert(1, "a2"); // ghost hit shifts the split

        core.clear();
        assert!(core.is_empty());
        assert_eq!(core.recency_share(), 2);
        assert_eq!(core.frequency_share(), 2);
        assert_eq!(core.recency_ghost_len(), 0);
        assert_eq!(core.frequency_ghost_len(), 0);

        core.insert(4, "d");
        assert_eq!(core.get(&4), Some("d"));
        core.check_invariants().unwrap();
    }

    impl<K, V> ArcCore<K, V>
    where
        K: Eq + std::hash::Hash + Clone,
    {
        fn inner_frequency(&self, key: &K) -> Option<u64> {
            self.frequency.frequency(key)
        }
    }
}
