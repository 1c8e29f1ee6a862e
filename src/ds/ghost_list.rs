//! Bounded FIFO of recently evicted keys.
//!
//! Adaptive policies keep a "ghost" record of keys they evicted: no values,
//! just key identity. A later miss that lands on a ghost is evidence the
//! eviction was premature, which the policy uses to re-balance its capacity
//! split. Backed by an [`EntryList`] in insertion order plus a hash index for
//! O(1) membership checks.
//!
//! ```text
//!   record("d") at capacity 3:
//!     ["a", "b", "c"]  ─►  drop "a" (oldest)  ─►  ["b", "c", "d"]
//! ```
//!
//! A ghost hit is consumed with [`GhostList::remove`]; the same eviction is
//! never counted twice.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::list::{EntryList, NodeId};
use crate::error::InvariantError;

/// Bounded FIFO of keys (no values) that were recently evicted.
///
/// A capacity of 0 makes the list inert: records are ignored.
///
/// # Example
///
/// ```
/// use evictkit::ds::GhostList;
///
/// let mut ghost = GhostList::new(2);
/// ghost.record("a");
/// ghost.record("b");
/// ghost.record("c"); // "a" falls off the front
///
/// assert!(!ghost.contains(&"a"));
/// assert!(ghost.contains(&"b"));
/// assert!(ghost.remove(&"b")); // consume the ghost hit
/// assert!(!ghost.contains(&"b"));
/// ```
#[derive(Debug)]
pub struct GhostList<K> {
    list: EntryList<K>,
    index: FxHashMap<K, NodeId>,
    capacity: usize,
}

impl<K> GhostList<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a ghost list holding at most `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            list: EntryList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
        }
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns `true` if `key` is tracked.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Iterates over the tracked keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.index.keys()
    }

    /// Records an evicted `key`, dropping the oldest record when full.
    ///
    /// A key that is already tracked keeps its position; eviction order is
    /// strictly first-in, first-out.
    pub fn record(&mut self, key: K) {
        if self.capacity == 0 || self.index.contains_key(&key) {
            return;
        }
        if self.list.len() >= self.capacity {
            if let Some(oldest) = self.list.pop_front() {
                self.index.remove(&oldest);
            }
        }
        let id = self.list.push_back(key.clone());
        self.index.insert(key, id);
    }

    /// Removes `key` from the list; returns `true` if it was tracked.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(id) => {
                self.list.remove(id);
                true
            },
            None => false,
        }
    }

    /// Drops all tracked keys.
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    /// Verifies index/list agreement and the capacity bound.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_invariants()?;
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "ghost index holds {} keys but list holds {}",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.list.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "ghost list holds {} keys over capacity {}",
                self.list.len(),
                self.capacity
            )));
        }
        for (key, &id) in &self.index {
            if self.list.get(id) != Some(key) {
                return Err(InvariantError::new("ghost index entry names wrong node"));
            }
        }
        Ok(())
    }
}
