//! Cache Module
//!
//! The caching tier in front of history and statistics reads: backends, a
//! degrading store facade, cache-aside middleware, write-triggered
//! invalidation and hit/miss telemetry.

mod backend;
mod entry;
mod invalidation;
mod keys;
mod memory;
mod middleware;
mod redis;
mod stats;
mod store;
mod telemetry;


// Re-export public types
pub use backend::{CacheBackend, CacheError, CacheResult};
pub use entry::CacheEntry;
pub use invalidation::{Invalidator, Mutation};
pub use keys::{route_key, view_key, CachePolicy};
pub use memory::InMemoryBackend;
pub use middleware::{cache_aside, CacheAside, CACHE_STATUS_HEADER};
pub use self::redis::{RedisBackend, RedisBackendConfig};
pub use stats::CacheStats;
pub use store::CacheStore;
pub use telemetry::{PerformanceReport, Telemetry};

// == Key Prefixes ==
/// Prefix for entries keyed by route path
pub const ROUTE_PREFIX: &str = "cache";

/// View name for paginated history listings
pub const HISTORY_VIEW: &str = "history";

/// View name for aggregate distribution views
pub const STATS_VIEW: &str = "stats";

/// Patterns covering every cached read view
pub const READ_VIEW_PATTERNS: [&str; 3] = ["cache:*", "history:*", "stats:*"];

// == Counter Keys ==
/// Every generation since the last clear
pub const TOTAL_GENERATED_KEY: &str = "counter:generated:total";

/// Generations since local midnight; expires at the next midnight
pub const DAILY_GENERATED_KEY: &str = "counter:generated:daily";

/// Wrapped read invocations
pub const CACHE_REQUESTS_KEY: &str = "counter:cache:requests";

pub const CACHE_HITS_KEY: &str = "counter:cache:hits";

pub const CACHE_MISSES_KEY: &str = "counter:cache:misses";
