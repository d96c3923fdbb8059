//! Cache Statistics Module
//!
//! Snapshot of the process-wide cache counters with hit-rate derivation.

use serde::Serialize;

// == Cache Stats ==
/// Counter values read from the cache store at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Wrapped read invocations
    pub total_requests: u64,
    /// Invocations served from the cache
    pub hits: u64,
    /// Invocations that went to the record store
    pub misses: u64,
}

impl CacheStats {
    // == Constructor ==
    pub fn new(total_requests: u64, hits: u64, misses: u64) -> Self {
        Self {
            total_requests,
            hits,
            misses,
        }
    }

    // == Hit Rate ==
    /// Hits as a percentage of hits plus misses, or 0.0 with no traffic.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }

    /// Hit rate rendered with two decimals and a percent sign.
    pub fn hit_rate_display(&self) -> String {
        format!("{:.2}%", self.hit_rate())
    }
}
