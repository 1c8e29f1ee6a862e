//! Frequency half of the adaptive cache (T2 + its ghost B2).
//!
//! A frequency-bucketed table ([`FrequencyBuckets`]) with a capacity share
//! and a ghost of its evictions. Entries arrive here by promotion from the
//! recency half and restart at frequency 1; eviction takes the oldest entry
//! of the minimum-frequency bucket, exactly as the standalone LFU engine
//! does, but without the aging controller.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::freq_buckets::FrequencyBuckets;
use crate::ds::ghost_list::GhostList;
use crate::error::InvariantError;

/// T2: frequency-ordered entries with a ghost of its evictions.
#[derive(Debug)]
pub(crate) struct FrequencyPart<K, V> {
    entries: FrequencyBuckets<K, V>,
    ghost: GhostList<K>,
    share: usize,
}

impl<K, V> FrequencyPart<K, V>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new(share: usize, ghost_capacity: usize) -> Self {
        Self {
            entries: FrequencyBuckets::new(),
            ghost: GhostList::new(ghost_capacity),
            share,
        }
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn share(&self) -> usize {
        self.share
    }

    pub(crate) fn ghost_len(&self) -> usize {
        self.ghost.len()
    }

    pub(crate) fn frequency(&self, key: &K) -> Option<u64> {
        self.entries.frequency(key)
    }

    /// Consumes a ghost record for `key`; returns `true` on a ghost hit.
    pub(crate) fn take_ghost(&mut self, key: &K) -> bool {
        self.ghost.remove(key)
    }

    pub(crate) fn ghost_contains(&self, key: &K) -> bool {
        self.ghost.contains(key)
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub(crate) fn ghost_keys(&self) -> impl Iterator<Item = &K> {
        self.ghost.keys()
    }

    /// Grows this half's capacity share by one.
    pub(crate) fn grow(&mut self) {
        self.share += 1;
    }

    /// Shrinks this half's capacity share by one, evicting first if the
    /// half is full. Returns `false` when the share is already zero.
    pub(crate) fn shrink(&mut self) -> bool {
        if self.share == 0 {
            return false;
        }
        if self.entries.len() >= self.share {
            self.evict_least_frequent();
        }
        self.share -= 1;
        true
    }

    /// Overwrites the value for a key already in this half, counting the
    /// write as an access. Returns the previous value.
    pub(crate) fn update(&mut self, key: &K, value: V) -> Option<V> {
        let previous = self.entries.set_value(key, value)?;
        self.entries.touch(key);
        Some(previous)
    }

    /// Looks up `key`, bumping its frequency on a hit.
    pub(crate) fn get(&mut self, key: &K) -> Option<&V> {
        self.entries.touch(key)?;
        self.entries.peek(key)
    }

    /// Admits a promoted entry at frequency 1, evicting first if the half
    /// is full. Callers must ensure the share is nonzero.
    pub(crate) fn admit(&mut self, key: K, value: V) {
        debug_assert!(self.share > 0);
        if self.entries.len() >= self.share {
            self.evict_least_frequent();
        }
        self.entries.insert(key, value);
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(value, _)| value)
    }

    /// Evicts the least frequent (oldest within its bucket) entry,
    /// recording its key in the ghost list.
    fn evict_least_frequent(&mut self) {
        if let Some((key, _, _)) = self.entries.pop_min() {
            self.ghost.record(key);
        }
    }

    pub(crate) fn check_invariants(&self) -> Result<(), InvariantError> {
        self.entries.check_invariants()?;
        self.ghost.check_invariants()?;
        if self.entries.len() > self.share {
            return Err(InvariantError::new(format!(
                "frequency half holds {} entries over its share {}",
                self.entries.len(),
                self.share
            )));
        }
        Ok(())
    }
}
