//! Recency half of the adaptive cache (T1 + its ghost B1).
//!
//! A bounded LRU list whose entries also carry an access count. Each touch
//! moves the entry to the MRU position and bumps the count; once the count
//! reaches the promotion threshold the entry is detached and handed back to
//! the coordinator, which re-admits it into the frequency half. Evicted keys
//! are recorded in the ghost list so the coordinator can spot premature
//! evictions later.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::ghost_list::GhostList;
use crate::ds::list::{EntryList, NodeId};
use crate::error::InvariantError;

#[derive(Debug)]
struct RecencyEntry<K, V> {
    key: K,
    value: V,
    accesses: u64,
}

/// Outcome of a hit in the recency half.
pub(crate) enum RecencyHit<K, V> {
    /// The entry stays in the half; a copy of its value is returned.
    Retained(V),
    /// The access crossed the promotion threshold; the entry has been
    /// detached and must be admitted into the frequency half.
    Promoted(K, V),
}

/// T1: recency list with per-entry access counts and a ghost of its
/// evictions.
#[derive(Debug)]
pub(crate) struct RecencyPart<K, V> {
    index: FxHashMap<K, NodeId>,
    list: EntryList<RecencyEntry<K, V>>,
    ghost: GhostList<K>,
    share: usize,
    threshold: u64,
}

impl<K, V> RecencyPart<K, V>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new(share: usize, ghost_capacity: usize, threshold: u64) -> Self {
        Self {
            index: FxHashMap::with_capacity_and_hasher(share, Default::default()),
            list: EntryList::with_capacity(share),
            ghost: GhostList::new(ghost_capacity),
            share,
            threshold,
        }
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    pub(crate) fn share(&self) -> usize {
        self.share
    }

    pub(crate) fn ghost_len(&self) -> usize {
        self.ghost.len()
    }

    /// Consumes a ghost record for `key`; returns `true` on a ghost hit.
    pub(crate) fn take_ghost(&mut self, key: &K) -> bool {
        self.ghost.remove(key)
    }

    pub(crate) fn ghost_contains(&self, key: &K) -> bool {
        self.ghost.contains(key)
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &K> {
        self.index.keys()
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
        if self.index.len() >= self.share {
            self.evict_lru();
        }
        self.share -= 1;
        true
    }

    /// Inserts or overwrites.
    ///
    /// Returns the previous value (on overwrite) and, when the touch crossed
    /// the promotion threshold and `may_promote` allows it, the detached
    /// entry for admission into the frequency half. With a share of zero
    /// admission is rejected.
    pub(crate) fn put(
        &mut self,
        key: K,
        value: V,
        may_promote: bool,
    ) -> (Option<V>, Option<(K, V)>) {
        if let Some(&id) = self.index.get(&key) {
            let entry = self.list.get_mut(id).expect("indexed recency node missing");
            let previous = std::mem::replace(&mut entry.value, value);
            entry.accesses += 1;
            let crossed = entry.accesses >= self.threshold;
            if crossed && may_promote {
                let entry = self
                    .list
                    .remove(id)
                    .expect("indexed recency node missing");
                self.index.remove(&key);
                return (Some(previous), Some((entry.key, entry.value)));
            }
            self.list.move_to_back(id);
            return (Some(previous), None);
        }

        if self.share == 0 {
            return (None, None);
        }
        if self.index.len() >= self.share {
            self.evict_lru();
        }
        let id = self.list.push_back(RecencyEntry {
            key: key.clone(),
            value,
            accesses: 1,
        });
        self.index.insert(key, id);
        (None, None)
    }

    /// Looks up `key`, bumping its access count and recency on a hit.
    pub(crate) fn get(&mut self, key: &K, may_promote: bool) -> Option<RecencyHit<K, V>>
    where
        V: Clone,
    {
        let &id = self.index.get(key)?;
        let entry = self.list.get_mut(id).expect("indexed recency node missing");
        entry.accesses += 1;
        let crossed = entry.accesses >= self.threshold;
        if crossed && may_promote {
            let entry = self
                .list
                .remove(id)
                .expect("indexed recency node missing");
            self.index.remove(key);
            return Some(RecencyHit::Promoted(entry.key, entry.value));
        }
        self.list.move_to_back(id);
        let value = self
            .list
            .get(id)
            .map(|entry| entry.value.clone())
            .expect("indexed recency node missing");
        Some(RecencyHit::Retained(value))
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        self.list.remove(id).map(|entry| entry.value)
    }

    /// Evicts the LRU entry, recording its key in the ghost list.
    fn evict_lru(&mut self) {
        if let Some(entry) = self.list.pop_front() {
            self.index.remove(&entry.key);
            self.ghost.record(entry.key);
        }
    }

    pub(crate) fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_invariants()?;
        self.ghost.check_invariants()?;
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(
                "recency index and list lengths disagree",
            ));
        }
        if self.index.len() > self.share {
            return Err(InvariantError::new(format!(
                "recency half holds {} entries over its share {}",
                self.index.len(),
                self.share
            )));
        }
        for (key, &id) in &self.index {
            match self.list.get(id) {
                Some(entry) if &entry.key == key => {
                    if entry.accesses == 0 {
                        return Err(InvariantError::new("recency entry with zero accesses"));
                    }
                    if self.ghost.contains(key) {
                        return Err(InvariantError::new("live recency key also in its ghost"));
                    }
                },
                _ => return Err(InvariantError::new("recency index names wrong node")),
            }
        }
        Ok(())
    }
}
