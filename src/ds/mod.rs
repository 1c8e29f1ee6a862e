//! Data-structure primitives shared by the eviction engines.

pub mod freq_buckets;
pub mod ghost_list;
pub mod list;
pub mod shard;

pub use freq_buckets::FrequencyBuckets;
pub use ghost_list::GhostList;
pub use list::{EntryList, NodeId};
pub use shard::ShardSelector;
