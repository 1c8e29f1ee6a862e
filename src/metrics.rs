//! Operation counters for the eviction engines (feature `metrics`).
//!
//! Plain counters recorded inline under each engine's lock; no atomics, no
//! background aggregation. A snapshot is a cheap copy taken while holding
//! the lock, so its fields are mutually consistent.
//!
//! Policy-specific fields stay 0 for engines that never record them
//! (`aging_sweeps` is LFU-only, `ghost_hits` and `promotions` belong to ARC
//! and LRU-K).

/// Counter block owned by each engine core.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct CacheMetrics {
    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_admissions: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub evictions: u64,
    pub removals: u64,
    pub clears: u64,
    pub ghost_hits: u64,
    pub promotions: u64,
    pub aging_sweeps: u64,
}

impl CacheMetrics {
    pub(crate) fn record_insert_update(&mut self) {
        self.insert_calls += 1;
        self.insert_updates += 1;
    }

    pub(crate) fn record_insert_admission(&mut self) {
        self.insert_calls += 1;
        self.insert_admissions += 1;
    }

    pub(crate) fn record_insert_rejected(&mut self) {
        self.insert_calls += 1;
    }

    pub(crate) fn record_hit(&mut self) {
        self.get_hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.get_misses += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub(crate) fn record_removal(&mut self) {
        self.removals += 1;
    }

    pub(crate) fn record_clear(&mut self) {
        self.clears += 1;
    }

    pub(crate) fn record_ghost_hit(&mut self) {
        self.ghost_hits += 1;
    }

    pub(crate) fn record_promotion(&mut self) {
        self.promotions += 1;
    }

    pub(crate) fn record_aging_sweep(&mut self) {
        self.aging_sweeps += 1;
    }

    pub(crate) fn snapshot(&self, len: usize, capacity: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            insert_calls: self.insert_calls,
            insert_updates: self.insert_updates,
            insert_admissions: self.insert_admissions,
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            evictions: self.evictions,
            removals: self.removals,
            clears: self.clears,
            ghost_hits: self.ghost_hits,
            promotions: self.promotions,
            aging_sweeps: self.aging_sweeps,
            len,
            capacity,
        }
    }
}

/// Point-in-time view of an engine's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total `insert` calls.
    pub insert_calls: u64,
    /// Inserts that overwrote an existing entry.
    pub insert_updates: u64,
    /// Inserts that admitted a new entry.
    pub insert_admissions: u64,
    /// Lookups that found their key.
    pub get_hits: u64,
    /// Lookups that missed.
    pub get_misses: u64,
    /// Entries displaced by capacity pressure.
    pub evictions: u64,
    /// Entries removed explicitly.
    pub removals: u64,
    /// `clear` calls.
    pub clears: u64,
    /// Misses that landed on a ghost record (ARC).
    pub ghost_hits: u64,
    /// Entries promoted across internal tiers (ARC, LRU-K).
    pub promotions: u64,
    /// Frequency aging sweeps performed (LFU).
    pub aging_sweeps: u64,
    /// Entry count at snapshot time.
    pub len: usize,
    /// Configured capacity.
    pub capacity: usize,
}

impl MetricsSnapshot {
    /// Hit rate over all lookups, or `None` before the first lookup.
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.get_hits + self.get_misses;
        (total > 0).then(|| self.get_hits as f64 / total as f64)
    }
}
