//! evictkit: in-process key/value caches with interchangeable eviction policies.
//!
//! Every engine implements the same contract ([`traits::Cache`]) behind its own
//! internal lock, so policies can be swapped without touching call sites:
//!
//! - [`policy::lru::LruCache`]: least-recently-used.
//! - [`policy::lru_k::LruKCache`]: admission only after K observations.
//! - [`policy::lfu::LfuCache`]: least-frequently-used with frequency aging.
//! - [`policy::arc::ArcCache`]: adaptive recency/frequency split driven by ghost lists.
//! - [`policy::sharded::ShardedCache`]: key-space partitioning over any engine.
//!
//! ```
//! use evictkit::prelude::*;
//!
//! let cache = LruCache::new(2);
//! cache.insert(1, "a");
//! cache.insert(2, "b");
//! cache.insert(3, "c"); // evicts 1
//! assert_eq!(cache.get(&1), None);
//! assert_eq!(cache.get(&3), Some("c"));
//! ```

pub mod ds;
pub mod policy;

pub mod builder;
pub mod error;
pub mod prelude;
pub mod traits;

#[cfg(feature = "metrics")]
pub mod metrics;
