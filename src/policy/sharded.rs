//! Sharded wrapper: key-space partitioning over N independent engines.
//!
//! Under heavy concurrency a single engine serializes every operation on one
//! lock. The sharded wrapper splits the key space by hash across N
//! independent engines, so operations on different shards never contend:
//!
//! ```text
//!   insert(k, v) ──► shard = hash(k) % N ──► engines[shard].insert(k, v)
//! ```
//!
//! There is no cross-shard invariant and no wrapper-level lock: each shard's
//! own mutex is the only synchronization. Callers that need ordering between
//! operations on different shards must serialize externally.
//!
//! Each shard receives `⌈capacity / N⌉` capacity, so the global capacity is
//! that value times N (rounded up from the requested total). A shard count
//! of 0 resolves to the machine's available parallelism.

use std::hash::Hash;

use crate::ds::shard::ShardSelector;
use crate::policy::arc::ArcCache;
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::policy::lru_k::LruKCache;
use crate::traits::Cache;

/// Resolves a configured shard count, mapping 0 to available parallelism.
fn resolve_shard_count(shard_count: usize) -> usize {
    if shard_count > 0 {
        shard_count
    } else {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// N independent engines behind the uniform contract.
///
/// # Example
///
/// ```
/// use evictkit::traits::Cache;
/// use evictkit::policy::sharded::ShardedCache;
///
/// let cache = ShardedCache::lru(8, 2);
/// assert_eq!(cache.shard_count(), 2);
/// for key in 0..100u64 {
///     cache.insert(key, key);
/// }
/// // Four entries per shard at most.
/// assert!(cache.len() <= 8);
/// ```
pub struct ShardedCache<C> {
    shards: Vec<C>,
    selector: ShardSelector,
}

impl<C> ShardedCache<C> {
    /// Builds N shards by calling `factory` with each shard's capacity
    /// (`⌈capacity / N⌉`).
    ///
    /// A `shard_count` of 0 resolves to the available hardware parallelism.
    pub fn with_factory(
        capacity: usize,
        shard_count: usize,
        factory: impl Fn(usize) -> C,
    ) -> Self {
        let count = resolve_shard_count(shard_count);
        let shard_capacity = capacity.div_ceil(count);
        Self {
            shards: (0..count).map(|_| factory(shard_capacity)).collect(),
            selector: ShardSelector::new(count, 0),
        }
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_for<K: Hash>(&self, key: &K) -> &C {
        &self.shards[self.selector.shard_for_key(key)]
    }
}

impl<K, V> ShardedCache<LruCache<K, V>>
where
    K: Eq + Hash + Clone,
{
    /// Sharded LRU with the given total capacity.
    pub fn lru(capacity: usize, shard_count: usize) -> Self {
        Self::with_factory(capacity, shard_count, LruCache::new)
    }
}

impl<K, V> ShardedCache<LruKCache<K, V>>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Sharded LRU-K; each shard gets `⌈history_capacity / N⌉` history slots.
    pub fn lru_k(capacity: usize, history_capacity: usize, k: usize, shard_count: usize) -> Self {
        let count = resolve_shard_count(shard_count);
        let shard_history = history_capacity.div_ceil(count);
        Self::with_factory(capacity, count, |shard_capacity| {
            LruKCache::with_k(shard_capacity, shard_history, k)
        })
    }
}

impl<K, V> ShardedCache<LfuCache<K, V>>
where
    K: Eq + Hash + Clone,
{
    /// Sharded LFU with a shared aging threshold.
    pub fn lfu(capacity: usize, max_average: u64, shard_count: usize) -> Self {
        Self::with_factory(capacity, shard_count, |shard_capacity| {
            LfuCache::with_max_average(shard_capacity, max_average)
        })
    }
}

impl<K, V> ShardedCache<ArcCache<K, V>>
where
    K: Eq + Hash + Clone,
{
    /// Sharded adaptive cache with a shared promotion threshold.
    pub fn arc(capacity: usize, promotion_threshold: u64, shard_count: usize) -> Self {
        Self::with_factory(capacity, shard_count, |shard_capacity| {
            ArcCache::with_threshold(shard_capacity, promotion_threshold)
        })
    }
}

impl<K, V, C> Cache<K, V> for ShardedCache<C>
where
    K: Eq + Hash,
    C: Cache<K, V>,
{
    fn insert(&self, key: K, value: V) -> Option<V> {
        self.shard_for(&key).insert(key, value)
    }

    fn get(&self, key: &K) -> Option<V> {
        self.shard_for(key).get(key)
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.shard_for(key).remove(key)
    }

    fn clear(&self) {
        for shard in &self.shards {
            shard.clear();
        }
    }

    fn contains(&self, key: &K) -> bool {
        self.shard_for(key).contains(key)
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.len()).sum()
    }

    fn capacity(&self) -> usize {
        self.shards.iter().map(|shard| shard.capacity()).sum()
    }
}
