//! Query cache.
//!
//! Holds the result of every subscribed query, keyed by endpoint name and
//! canonical arguments, and tags each entry so mutations can invalidate it:
//!
//! - **Tags**: `Notice` reaches every notice entry, `SocietyMembers:42` only
//!   the members list of society 42.
//! - **Store**: deduplicates concurrent fetches, keeps the latest fetch's
//!   result, refetches subscribed entries on invalidation and evicts entries
//!   nobody has used for `keep_unused_for_secs`.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! keep_unused_for_secs = 60
//! query_retries = 0
//! retry_base_delay_ms = 250
//! ```

mod config;
mod keys;
pub(crate) mod lock;
mod registry;
mod store;
mod subscription;
mod tags;

/// Names of the counters the store records.
pub mod metric_names {
    pub const CACHE_HIT_TOTAL: &str = "deptportal_cache_hit_total";
    pub const CACHE_MISS_TOTAL: &str = "deptportal_cache_miss_total";
    pub const CACHE_DEDUP_TOTAL: &str = "deptportal_cache_dedup_total";
    pub const CACHE_INVALIDATED_TOTAL: &str = "deptportal_cache_invalidated_total";
    pub const CACHE_EVICT_TOTAL: &str = "deptportal_cache_evict_total";
}

pub use config::CacheConfig;
pub use keys::{QueryKey, canonical_json};
pub use registry::TagRegistry;
pub use store::{CacheStore, FetchDone, Lease, SubscribeOutcome, Subscribed};
pub use subscription::{QueryOptions, QueryStatus, QuerySubscription, QueryView, Snapshot};
pub use tags::{Tag, TagType};
