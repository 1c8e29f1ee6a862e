// ==============================================
// CROSS-POLICY INVARIANT TESTS (integration)
// ==============================================
//
// Structural properties that must hold after every public call, checked
// across all engines: capacity bounds, index/list agreement, frequency
// bookkeeping, half disjointness, and uniform capacity-0 behavior.

use evictkit::policy::arc::ArcCore;
use evictkit::policy::lfu::LfuCore;
use evictkit::policy::lru::LruCore;
use evictkit::policy::lru_k::LruKCore;

// A deterministic but scrambled op stream: inserts, lookups and removals
// over a small key universe, so every structural path gets exercised.
fn churn<F: FnMut(u64, u64)>(mut step: F) {
    let mut state = 0x2545_f491_4f6c_dd1du64;
    for round in 0..2000u64 {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        step(round, state);
    }
}

mod capacity_bound {
    use super::*;

    #[test]
    fn lru_never_exceeds_capacity() {
        let mut core = LruCore::new(7);
        churn(|round, noise| {
            match noise % 3 {
                0 => {
                    core.insert(noise % 32, round);
                },
                1 => {
                    core.get(&(noise % 32));
                },
                _ => {
                    core.remove(&(noise % 32));
                },
            }
            assert!(core.len() <= 7);
            core.check_invariants().unwrap();
        });
    }

    #[test]
    fn lfu_never_exceeds_capacity() {
        let mut core = LfuCore::with_max_average(7, 5);
        churn(|round, noise| {
            match noise % 3 {
                0 => {
                    core.insert(noise % 32, round);
                },
                1 => {
                    core.get(&(noise % 32));
                },
                _ => {
                    core.remove(&(noise % 32));
                },
            }
            assert!(core.len() <= 7);
            core.check_invariants().unwrap();
        });
    }

    #[test]
    fn lru_k_never_exceeds_capacity() {
        let mut core = LruKCore::with_k(7, 5, 2);
        churn(|round, noise| {
            match noise % 3 {
                0 => {
                    core.insert(noise % 32, round);
                },
                1 => {
                    core.get(&(noise % 32));
                },
                _ => {
                    core.remove(&(noise % 32));
                },
            }
            assert!(core.len() <= 7);
            core.check_invariants().unwrap();
        });
    }

    #[test]
    fn arc_halves_respect_their_shares() {
        let mut core = ArcCore::with_threshold(7, 2);
        churn(|round, noise| {
            match noise % 3 {
                0 => {
                    core.insert(noise % 32, round);
                },
                1 => {
                    core.get(&(noise % 32));
                },
                _ => {
                    core.remove(&(noise % 32));
                },
            }
            assert!(core.recency_len() <= core.recency_share());
            assert!(core.frequency_len() <= core.frequency_share());
            assert!(core.recency_ghost_len() <= core.capacity());
            assert!(core.frequency_ghost_len() <= core.capacity());
            core.check_invariants().unwrap();
        });
    }
}

mod lfu_accounting {
    use super::*;

    // After any operation the average access count sits at or below the
    // configured threshold, because overshooting triggers the sweep within
    // the same call.
    #[test]
    fn average_never_stays_above_threshold() {
        let max_average = 8u64;
        let mut core = LfuCore::with_max_average(5, max_average);
        churn(|round, noise| {
            match noise % 4 {
                0 => {
                    core.insert(noise % 8, round);
                },
                _ => {
                    core.get(&(noise % 8));
                },
            }
            if core.len() > 0 {
                let freq_sum: u64 = (0..8u64).filter_map(|k| core.frequency(&k)).sum();
                assert!(freq_sum / core.len() as u64 <= max_average + max_average / 2);
            }
            core.check_invariants().unwrap();
        });
    }

    #[test]
    fn no_frequency_ever_reaches_zero() {
        let mut core = LfuCore::with_max_average(4, 3);
        churn(|round, noise| {
            core.insert(noise % 6, round);
            core.get(&(noise % 6));
            for key in 0..6u64 {
                if let Some(freq) = core.frequency(&key) {
                    assert!(freq >= 1);
                }
            }
        });
    }
}

mod lru_k_coupling {
    use super::*;

    // Staged keys always have a live history entry, and promoted keys have
    // neither. check_invariants verifies both after every step.
    #[test]
    fn staging_and_history_stay_coupled() {
        let mut core = LruKCore::with_k(5, 3, 2);
        churn(|round, noise| {
            match noise % 3 {
                0 => {
                    core.insert(noise % 16, round);
                },
                1 => {
                    core.get(&(noise % 16));
                },
                _ => {
                    core.remove(&(noise % 16));
                },
            }
            assert!(core.history_len() <= 3);
            core.check_invariants().unwrap();
        });
    }
}

mod arc_disjointness {
    use super::*;

    // A key appears in at most one of {T1, T2, B1, B2}; check_invariants
    // walks all four sets.
    #[test]
    fn sets_stay_pairwise_disjoint() {
        let mut core = ArcCore::with_threshold(5, 2);
        churn(|round, noise| {
            match noise % 4 {
                0 | 1 => {
                    core.insert(noise % 16, round);
                },
                2 => {
                    core.get(&(noise % 16));
                },
                _ => {
                    core.remove(&(noise % 16));
                },
            }
            core.check_invariants().unwrap();
        });
    }
}

mod zero_capacity {
    use evictkit::prelude::*;

    // Every engine honors capacity 0 the same way: inserts are no-ops and
    // lookups always miss.
    #[test]
    fn all_engines_reject_at_zero_capacity() {
        let engines: Vec<(&str, Engine<u32, u32>)> = vec![
            ("lru", CacheBuilder::new(0).build(CachePolicy::Lru)),
            (
                "lru_k",
                CacheBuilder::new(0).build(CachePolicy::LruK {
                    history_capacity: 4,
                    k: 2,
                }),
            ),
            ("lfu", CacheBuilder::new(0).build(CachePolicy::lfu())),
            ("arc", CacheBuilder::new(0).build(CachePolicy::arc())),
        ];

        for (name, cache) in engines {
            assert_eq!(cache.capacity(), 0, "engine {name}");
            cache.insert(1, 1);
            assert_eq!(cache.len(), 0, "engine {name}");
            assert_eq!(cache.get(&1), None, "engine {name}");
            assert!(!cache.contains(&1), "engine {name}");
        }
    }

    #[test]
    fn sharded_zero_capacity_is_inert() {
        let cache: ShardedCache<LruCache<u32, u32>> = ShardedCache::lru(0, 4);
        cache.insert(1, 1);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get(&1), None);
    }
}
