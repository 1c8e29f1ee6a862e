//! # The Cache Contract
//!
//! This module defines the uniform surface every eviction engine implements.
//! Engines differ only in *which* entry they evict under pressure; the
//! operations callers see are identical, so a policy can be swapped without
//! touching call sites.
//!
//! ```text
//!                 ┌──────────────────────────────────────────┐
//!                 │              Cache<K, V>                 │
//!                 │                                          │
//!                 │  insert(&self, K, V) → Option<V>         │
//!                 │  get(&self, &K) → Option<V>              │
//!                 │  get_or_default(&self, &K) → V           │
//!                 │  remove(&self, &K) → Option<V>           │
//!                 │  clear(&self)                            │
//!                 │  contains / len / is_empty / capacity    │
//!                 └───────────────────┬──────────────────────┘
//!                                     │
//!         ┌──────────┬────────────────┼────────────────┬──────────────┐
//!         ▼          ▼                ▼                ▼              ▼
//!     LruCache   LruKCache        LfuCache         ArcCache   ShardedCache<C>
//! ```
//!
//! ## Design notes
//!
//! - **Interior locking.** Every method takes `&self`: each engine owns a
//!   single `parking_lot::Mutex` around its core and acquires it for the
//!   duration of the call. The sharded wrapper adds no lock of its own; it
//!   routes to one of its shards.
//! - **Values are returned by value.** `get` clones the stored `V`; callers
//!   never hold references into cache state, so no lock outlives a call.
//!   Use `V = Arc<T>` when clones must stay cheap.
//! - **Two lookup forms.** `get` is the presence-disambiguating form.
//!   `get_or_default` is a convenience that collapses absence into
//!   `V::default()`; it MUST NOT be used to decide whether a key is cached,
//!   since a stored default value and a miss are indistinguishable.
//! - **No recoverable errors.** A full cache is not a failure; it triggers a
//!   silent eviction chosen by the policy. There is no eviction callback.
//!
//! ## Example
//!
//! ```
//! use evictkit::traits::Cache;
//! use evictkit::policy::lru::LruCache;
//! use evictkit::policy::lfu::LfuCache;
//!
//! fn warm<C: Cache<u64, String>>(cache: &C, data: &[(u64, &str)]) {
//!     for (key, value) in data {
//!         cache.insert(*key, value.to_string());
//!     }
//! }
//!
//! let lru = LruCache::new(10);
//! let lfu = LfuCache::new(10);
//! warm(&lru, &[(1, "one"), (2, "two")]);
//! warm(&lfu, &[(1, "one"), (2, "two")]);
//! assert_eq!(lru.len(), 2);
//! assert_eq!(lfu.len(), 2);
//! ```

use std::hash::Hash;

/// Uniform, thread-safe cache surface implemented by every eviction engine.
///
/// All operations are O(1) apart from `clear` and the LFU aging sweep, and
/// every mutating operation leaves the engine's hash index and ordering
/// structures mutually consistent.
///
/// # Example
///
/// ```
/// use evictkit::traits::Cache;
/// use evictkit::policy::lru::LruCache;
///
/// let cache = LruCache::new(3);
/// assert_eq!(cache.insert(1, "one"), None);
/// assert_eq!(cache.insert(1, "uno"), Some("one"));
/// assert_eq!(cache.get(&1), Some("uno"));
/// assert_eq!(cache.remove(&1), Some("uno"));
/// assert!(cache.is_empty());
/// ```
pub trait Cache<K, V>: Send + Sync
where
    K: Eq + Hash,
{
    /// Inserts a key/value pair, returning the previous value on overwrite.
    ///
    /// An overwrite counts as an access and promotes the entry's
    /// recency/frequency standing. A new key may evict another entry
    /// according to the engine's policy. With a configured capacity of zero
    /// the insert is a no-op.
    fn insert(&self, key: K, value: V) -> Option<V>;

    /// Looks up a key, returning a copy of its value on a hit.
    ///
    /// A hit updates the entry's recency/frequency standing. A miss does not
    /// mutate the cache, with one policy-specific exception: the LRU-K engine
    /// records misses in its observation history (that is its admission
    /// mechanism).
    fn get(&self, key: &K) -> Option<V>;

    /// Convenience lookup that returns `V::default()` on a miss.
    ///
    /// This form cannot distinguish a stored default value from an absent
    /// key; use [`get`](Cache::get) when presence matters.
    fn get_or_default(&self, key: &K) -> V
    where
        V: Default,
    {
        self.get(key).unwrap_or_default()
    }

    /// Removes an entry, returning its value if the key was present.
    fn remove(&self, key: &K) -> Option<V>;

    /// Drops all entries and resets ordering state.
    ///
    /// Capacity and policy parameters are preserved.
    fn clear(&self);

    /// Returns `true` if the key is cached, without touching its
    /// recency/frequency standing.
    fn contains(&self, key: &K) -> bool;

    /// Returns the number of cached entries.
    fn len(&self) -> usize;

    /// Returns `true` if the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the configured capacity.
    fn capacity(&self) -> usize;
}
