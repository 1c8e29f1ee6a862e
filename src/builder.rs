//! Runtime policy selection behind one concrete type.
//!
//! Callers that pick their eviction policy from configuration rather than at
//! compile time build an [`Engine`]: a tagged union of the four engines that
//! itself implements the [`Cache`] contract. Sharding composes on top, since
//! [`ShardedCache`] accepts any contract implementation.
//!
//! ```
//! use evictkit::builder::{CacheBuilder, CachePolicy};
//! use evictkit::traits::Cache;
//!
//! let cache = CacheBuilder::new(100).build::<u64, String>(CachePolicy::Lru);
//! cache.insert(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::hash::Hash;

use crate::policy::arc::{ArcCache, DEFAULT_PROMOTION_THRESHOLD};
use crate::policy::lfu::{DEFAULT_MAX_AVERAGE, LfuCache};
use crate::policy::lru::LruCache;
use crate::policy::lru_k::LruKCache;
use crate::policy::sharded::ShardedCache;
use crate::traits::Cache;

/// Available eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Least recently used.
    Lru,
    /// Admission after `k` observations, with a bounded observation history.
    LruK { history_capacity: usize, k: usize },
    /// Least frequently used; ages counts once the average exceeds
    /// `max_average`.
    Lfu { max_average: u64 },
    /// Adaptive recency/frequency split; entries migrate after
    /// `promotion_threshold` accesses.
    Arc { promotion_threshold: u64 },
}

impl CachePolicy {
    /// LFU with the default aging threshold.
    pub fn lfu() -> Self {
        Self::Lfu {
            max_average: DEFAULT_MAX_AVERAGE,
        }
    }

    /// ARC with the default promotion threshold.
    pub fn arc() -> Self {
        Self::Arc {
            promotion_threshold: DEFAULT_PROMOTION_THRESHOLD,
        }
    }
}

/// A cache whose policy was chosen at runtime.
///
/// Dispatches every contract call to the selected engine.
pub enum Engine<K, V> {
    Lru(LruCache<K, V>),
    LruK(LruKCache<K, V>),
    Lfu(LfuCache<K, V>),
    Arc(ArcCache<K, V>),
}

impl<K, V> Cache<K, V> for Engine<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn insert(&self, key: K, value: V) -> Option<V> {
        match self {
            Engine::Lru(cache) => cache.insert(key, value),
            Engine::LruK(cache) => cache.insert(key, value),
            Engine::Lfu(cache) => cache.insert(key, value),
            Engine::Arc(cache) => cache.insert(key, value),
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        match self {
            Engine::Lru(cache) => cache.get(key),
            Engine::LruK(cache) => cache.get(key),
            Engine::Lfu(cache) => cache.get(key),
            Engine::Arc(cache) => cache.get(key),
        }
    }

    fn remove(&self, key: &K) -> Option<V> {
        match self {
            Engine::Lru(cache) => cache.remove(key),
            Engine::LruK(cache) => cache.remove(key),
            Engine::Lfu(cache) => cache.remove(key),
            Engine::Arc(cache) => cache.remove(key),
        }
    }

    fn clear(&self) {
        match self {
            Engine::Lru(cache) => cache.clear(),
            Engine::LruK(cache) => cache.clear(),
            Engine::Lfu(cache) => cache.clear(),
            Engine::Arc(cache) => cache.clear(),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match self {
            Engine::Lru(cache) => cache.contains(key),
            Engine::LruK(cache) => cache.contains(key),
            Engine::Lfu(cache) => cache.contains(key),
            Engine::Arc(cache) => cache.contains(key),
        }
    }

    fn len(&self) -> usize {
        match self {
            Engine::Lru(cache) => cache.len(),
            Engine::LruK(cache) => cache.len(),
            Engine::Lfu(cache) => cache.len(),
            Engine::Arc(cache) => cache.len(),
        }
    }

    fn capacity(&self) -> usize {
        match self {
            Engine::Lru(cache) => cache.capacity(),
            Engine::LruK(cache) => cache.capacity(),
            Engine::Lfu(cache) => cache.capacity(),
            Engine::Arc(cache) => cache.capacity(),
        }
    }
}

/// Builder for policy-selected caches.
pub struct CacheBuilder {
    capacity: usize,
}

impl CacheBuilder {
    /// Starts a builder for caches of the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Builds a single engine with the selected policy.
    pub fn build<K, V>(&self, policy: CachePolicy) -> Engine<K, V>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        match policy {
            CachePolicy::Lru => Engine::Lru(LruCache::new(self.capacity)),
            CachePolicy::LruK {
                history_capacity,
                k,
            } => Engine::LruK(LruKCache::with_k(self.capacity, history_capacity, k)),
            CachePolicy::Lfu { max_average } => {
                Engine::Lfu(LfuCache::with_max_average(self.capacity, max_average))
            },
            CachePolicy::Arc {
                promotion_threshold,
            } => Engine::Arc(ArcCache::with_threshold(self.capacity, promotion_threshold)),
        }
    }

    /// Builds `shard_count` engines of the selected policy behind a
    /// [`ShardedCache`] (0 means available parallelism).
    pub fn build_sharded<K, V>(
        &self,
        policy: CachePolicy,
        shard_count: usize,
    ) -> ShardedCache<Engine<K, V>>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        ShardedCache::with_factory(self.capacity, shard_count, |shard_capacity| {
            CacheBuilder::new(shard_capacity).build(policy)
        })
    }
}
