pub use crate::builder::{CacheBuilder, CachePolicy, Engine};
pub use crate::ds::{EntryList, FrequencyBuckets, GhostList, ShardSelector};
pub use crate::policy::arc::ArcCache;
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lru::LruCache;
pub use crate::policy::lru_k::LruKCache;
pub use crate::policy::sharded::ShardedCache;
pub use crate::traits::Cache;

#[cfg(feature = "metrics")]
pub use crate::metrics::MetricsSnapshot;
