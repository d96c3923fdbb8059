//! Telemetry Module
//!
//! Generation counters, cache hit/miss counters and the on-demand cache vs
//! record store latency probe. All counters live in the cache store; nothing
//! here can fail a caller's request.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::cache::{
    CacheStats, CacheStore, CACHE_HITS_KEY, CACHE_MISSES_KEY, CACHE_REQUESTS_KEY,
    DAILY_GENERATED_KEY, TOTAL_GENERATED_KEY,
};
use crate::clock::{seconds_until_midnight, Clock};
use crate::records::{RecordFilter, RecordResult, RecordStore, SortOrder};

/// Rows fetched by the record store side of the probe
const PROBE_READ_LIMIT: usize = 10;

// == Performance Report ==
/// Outcome of one latency probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceReport {
    /// Cache write+read+delete round trip; None when not measurable
    pub cache_latency_ms: Option<f64>,
    pub record_store_latency_ms: f64,
    /// record store latency / cache latency; None when not applicable
    pub speedup: Option<f64>,
}

impl PerformanceReport {
    pub fn new(cache_latency_ms: Option<f64>, record_store_latency_ms: f64) -> Self {
        let speedup = cache_latency_ms
            .filter(|ms| ms.is_finite() && *ms > 0.0)
            .map(|ms| record_store_latency_ms / ms)
            .filter(|ratio| ratio.is_finite());

        Self {
            cache_latency_ms,
            record_store_latency_ms,
            speedup,
        }
    }

    /// `"12.34x"`, or `"N/A"` when there is no meaningful ratio.
    pub fn speedup_display(&self) -> String {
        match self.speedup {
            Some(ratio) => format!("{:.2}x", ratio),
            None => "N/A".to_string(),
        }
    }
}

// == Telemetry ==
#[derive(Debug, Clone)]
pub struct Telemetry {
    store: CacheStore,
    clock: Arc<dyn Clock>,
}

impl Telemetry {
    pub fn new(store: CacheStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    // == Generation Counters ==
    /// Bumps the total and daily counters; the daily one expires at the next
    /// local midnight.
    pub async fn record_generation(&self) {
        self.store.increment(TOTAL_GENERATED_KEY).await;
        self.store.increment(DAILY_GENERATED_KEY).await;

        let ttl = seconds_until_midnight(self.clock.now());
        self.store.expire(DAILY_GENERATED_KEY, ttl).await;
        debug!(daily_ttl_secs = ttl, "generation recorded");
    }

    /// (total, today)
    pub async fn generation_counts(&self) -> (u64, u64) {
        let total = self.store.counter(TOTAL_GENERATED_KEY).await.max(0) as u64;
        let today = self.store.counter(DAILY_GENERATED_KEY).await.max(0) as u64;
        (total, today)
    }

    pub async fn reset_generation_counters(&self) {
        self.store.delete(TOTAL_GENERATED_KEY).await;
        self.store.delete(DAILY_GENERATED_KEY).await;
    }

    // == Cache Counters ==
    pub async fn record_hit(&self) {
        self.store.increment(CACHE_REQUESTS_KEY).await;
        self.store.increment(CACHE_HITS_KEY).await;
    }

    pub async fn record_miss(&self) {
        self.store.increment(CACHE_REQUESTS_KEY).await;
        self.store.increment(CACHE_MISSES_KEY).await;
    }

    pub async fn cache_stats(&self) -> CacheStats {
        let read = |n: i64| n.max(0) as u64;
        CacheStats::new(
            read(self.store.counter(CACHE_REQUESTS_KEY).await),
            read(self.store.counter(CACHE_HITS_KEY).await),
            read(self.store.counter(CACHE_MISSES_KEY).await),
        )
    }

    // == Performance Probe ==
    /// Times a throwaway cache round trip against a representative record
    /// store read.
    pub async fn probe(&self, records: &dyn RecordStore) -> RecordResult<PerformanceReport> {
        let cache_latency_ms = self.probe_cache().await;

        let started = Instant::now();
        records
            .find(RecordFilter::default(), SortOrder::NewestFirst, PROBE_READ_LIMIT, 0)
            .await?;
        records.count(RecordFilter::default()).await?;
        let record_store_latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        Ok(PerformanceReport::new(cache_latency_ms, record_store_latency_ms))
    }

    async fn probe_cache(&self) -> Option<f64> {
        if !self.store.is_ready() {
            return None;
        }

        let key = format!("probe:{}", Uuid::new_v4());
        let started = Instant::now();
        self.store.try_set(&key, "probe", 10).await.ok()?;
        let read_back = self.store.get(&key).await;
        self.store.delete(&key).await;
        let elapsed = started.elapsed().as_secs_f64() * 1000.0;

        read_back.map(|_| elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryBackend;
    use crate::clock::{ManualClock, SystemClock};
    use crate::records::InMemoryRecordStore;
    use chrono::{Duration, Local, TimeZone};

    fn telemetry_at(start: chrono::DateTime<Local>) -> (Telemetry, ManualClock) {
        let clock = ManualClock::new(start);
        let clock_arc: Arc<dyn Clock> = Arc::new(clock.clone());
        let store = CacheStore::new(Arc::new(InMemoryBackend::new(clock_arc.clone())));
        (Telemetry::new(store, clock_arc), clock)
    }

    fn evening() -> chrono::DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 6, 3, 23, 58, 0)
            .earliest()
            .unwrap()
    }

    #[tokio::test]
    async fn test_generation_counters() {
        let (telemetry, _) = telemetry_at(evening());
        telemetry.record_generation().await;
        telemetry.record_generation().await;

        assert_eq!(telemetry.generation_counts().await, (2, 2));
    }

    #[tokio::test]
    async fn test_daily_counter_resets_after_midnight() {
        let (telemetry, clock) = telemetry_at(evening());
        telemetry.record_generation().await;
        assert_eq!(telemetry.generation_counts().await, (1, 1));

        clock.advance(Duration::minutes(3));

        assert_eq!(telemetry.generation_counts().await, (1, 0));

        telemetry.record_generation().await;
        assert_eq!(telemetry.generation_counts().await, (2, 1));
    }

    #[tokio::test]
    async fn test_daily_counter_expiry_tracks_midnight() {
        let (telemetry, _) = telemetry_at(evening());
        telemetry.record_generation().await;

        assert_eq!(telemetry.store.remaining_ttl(DAILY_GENERATED_KEY).await, 120);
        assert_eq!(telemetry.store.remaining_ttl(TOTAL_GENERATED_KEY).await, -1);
    }

    #[tokio::test]
    async fn test_reset_generation_counters() {
        let (telemetry, _) = telemetry_at(evening());
        telemetry.record_generation().await;
        telemetry.reset_generation_counters().await;

        assert_eq!(telemetry.generation_counts().await, (0, 0));
    }

    #[tokio::test]
    async fn test_hit_rate_after_three_hits_one_miss() {
        let (telemetry, _) = telemetry_at(evening());
        for _ in 0..3 {
            telemetry.record_hit().await;
        }
        telemetry.record_miss().await;

        let stats = telemetry.cache_stats().await;
        assert_eq!(stats, CacheStats::new(4, 3, 1));
        assert_eq!(stats.hit_rate_display(), "75.00%");
    }

    #[tokio::test]
    async fn test_hit_rate_with_no_traffic() {
        let (telemetry, _) = telemetry_at(evening());
        assert_eq!(telemetry.cache_stats().await.hit_rate_display(), "0.00%");
    }

    #[tokio::test]
    async fn test_unavailable_store_counts_zero() {
        let telemetry = Telemetry::new(CacheStore::unavailable(), Arc::new(SystemClock));
        telemetry.record_generation().await;
        telemetry.record_hit().await;

        assert_eq!(telemetry.generation_counts().await, (0, 0));
        assert_eq!(telemetry.cache_stats().await, CacheStats::default());
    }

    #[tokio::test]
    async fn test_probe_with_ready_cache() {
        let store = CacheStore::new(Arc::new(InMemoryBackend::default()));
        let telemetry = Telemetry::new(store.clone(), Arc::new(SystemClock));
        let records = InMemoryRecordStore::new();

        let report = telemetry.probe(&records).await.unwrap();

        assert!(report.cache_latency_ms.is_some());
        assert!(report.record_store_latency_ms >= 0.0);
        // Throwaway key is removed
        assert_eq!(store.delete_matching("probe:*").await, 0);
    }

    #[tokio::test]
    async fn test_probe_without_cache_is_not_applicable() {
        let telemetry = Telemetry::new(CacheStore::unavailable(), Arc::new(SystemClock));
        let records = InMemoryRecordStore::new();

        let report = telemetry.probe(&records).await.unwrap();

        assert!(report.cache_latency_ms.is_none());
        assert!(report.speedup.is_none());
        assert_eq!(report.speedup_display(), "N/A");
    }

    #[test]
    fn test_speedup_computation() {
        let report = PerformanceReport::new(Some(0.5), 10.0);
        assert_eq!(report.speedup, Some(20.0));
        assert_eq!(report.speedup_display(), "20.00x");
    }

    #[test]
    fn test_speedup_zero_cache_latency() {
        let report = PerformanceReport::new(Some(0.0), 10.0);
        assert!(report.speedup.is_none());
        assert_eq!(report.speedup_display(), "N/A");
    }
}
