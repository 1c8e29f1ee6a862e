//! Least Recently Used (LRU) eviction engine.
//!
//! One recency-ordered [`EntryList`] plus a hash index. The back of the list
//! is the most-recently-used position; admitted and touched entries move
//! there, and capacity pressure evicts from the front.
//!
//! ```text
//!   index: FxHashMap<K, NodeId>        list: EntryList<LruEntry>
//!   ┌───────┬────────┐
//!   │ key   │ NodeId │                 front ─► [a] ◄──► [b] ◄──► [c] ◄─ back
//!   │ "a"   │ id_0   │──────────────►   LRU                        MRU
//!   │ ...   │ ...    │                 (evict)                   (touch)
//!   └───────┴────────┘
//! ```
//!
//! Split like every engine in this crate: [`LruCore`] is the single-threaded
//! state machine with the rich inherent API, [`LruCache`] wraps it in a
//! `parking_lot::Mutex` and implements the [`Cache`] contract.

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::list::{EntryList, NodeId};
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::{CacheMetrics, MetricsSnapshot};
use crate::traits::Cache;

#[derive(Debug)]
struct LruEntry<K, V> {
    key: K,
    value: V,
}

/// Single-threaded LRU core: hash index + recency list.
///
/// # Example
///
/// ```
/// use evictkit::policy::lru::LruCore;
///
/// let mut core = LruCore::new(2);
/// core.insert(1, "a");
/// core.insert(2, "b");
/// core.get(&1);        // 1 becomes MRU
/// core.insert(3, "c"); // evicts 2, the LRU entry
///
/// assert!(core.contains(&1));
/// assert!(!core.contains(&2));
/// ```
pub struct LruCore<K, V> {
    index: FxHashMap<K, NodeId>,
    list: EntryList<LruEntry<K, V>>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a core holding at most `capacity` entries.
    ///
    /// A capacity of 0 rejects every admission.
    pub fn new(capacity: usize) -> Self {
        Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            list: EntryList::with_capacity(capacity),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::default(),
        }
    }

    /// Inserts or overwrites; either way the entry ends up at the MRU
    /// position. Returns the previous value on overwrite.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            let entry = self.list.get_mut(id).expect("indexed lru node missing");
            let previous = std::mem::replace(&mut entry.value, value);
            self.list.move_to_back(id);
            return Some(previous);
        }

        if self.capacity == 0 {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_rejected();
            return None;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_admission();

        if self.index.len() >= self.capacity {
            self.pop_lru();
            #[cfg(feature = "metrics")]
            self.metrics.record_eviction();
        }

        let id = self.list.push_back(LruEntry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);
        None
    }

    /// Looks up `key`, moving the entry to the MRU position on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = match self.index.get(key) {
            Some(&id) => id,
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_miss();
                return None;
            },
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_hit();

        self.list.move_to_back(id);
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Read-only lookup that leaves the recency order untouched.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let &id = self.index.get(key)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Marks `key` as recently used without reading the value.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&id) => self.list.move_to_back(id),
            None => false,
        }
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let entry = self.list.pop_front()?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    /// Returns the least recently used entry without removing it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.front().map(|entry| (&entry.key, &entry.value))
    }

    /// Removes `key`, returning its value if present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        #[cfg(feature = "metrics")]
        self.metrics.record_removal();
        self.list.remove(id).map(|entry| entry.value)
    }

    /// Returns `true` if `key` is cached; does not touch recency order.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops all entries; capacity is preserved.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
        self.index.clear();
        self.list.clear();
    }

    /// Verifies index/list agreement and the capacity bound.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_invariants()?;
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but list holds {}",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.index.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.index.len(),
                self.capacity
            )));
        }
        for (key, &id) in &self.index {
            match self.list.get(id) {
                Some(entry) if &entry.key == key => {},
                _ => return Err(InvariantError::new("index entry names wrong node")),
            }
        }
        Ok(())
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.len(), self.capacity)
    }
}

impl<K, V> fmt::Debug for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Thread-safe LRU cache: an [`LruCore`] behind a `parking_lot::Mutex`.
///
/// Every contract method takes `&self` and holds the lock for the duration
/// of the call; values come back as clones.
///
/// # Example
///
/// ```
/// use evictkit::traits::Cache;
/// use evictkit::policy::lru::LruCache;
///
/// let cache = LruCache::new(3);
/// cache.insert(1, "a");
/// cache.insert(2, "b");
/// cache.insert(3, "c");
/// cache.get(&2);
/// cache.insert(4, "d"); // evicts 1
///
/// assert_eq!(cache.get(&1), None);
/// assert_eq!(cache.get(&2), Some("b"));
/// ```
pub struct LruCache<K, V> {
    inner: Mutex<LruCore<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCore::new(capacity)),
        }
    }

    /// Returns the least recently used entry without touching it.
    pub fn peek_lru(&self) -> Option<(K, V)>
    where
        V: Clone,
    {
        let core = self.inner.lock();
        core.peek_lru().map(|(k, v)| (k.clone(), v.clone()))
    }

    /// Read-only lookup that leaves the recency order untouched.
    pub fn peek(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

impl<K, V> Cache<K, V> for LruCache<K, V>
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

impl<K, V> fmt::Debug for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LruCache")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .finish_non_exhaustive()
    }
}
