//! Response DTOs for the secret service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheStats, PerformanceReport};
use crate::generator::{entropy_bits, Strength};
use crate::records::{GroupSummary, SecretRecord};

/// Response body for POST /api/generate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub id: String,
    pub password: String,
    pub length: usize,
    pub strength: Strength,
    /// `length * log2(pool_size)`
    pub entropy_bits: f64,
    pub generation_time_ms: f64,
    pub created_at: DateTime<Utc>,
}

impl GenerateResponse {
    pub fn new(record: &SecretRecord) -> Self {
        Self {
            id: record.id.clone(),
            password: record.value.clone(),
            length: record.length,
            strength: record.strength,
            entropy_bits: entropy_bits(record.length, record.options.pool_size()),
            generation_time_ms: record.generation_time_ms,
            created_at: record.created_at,
        }
    }
}

/// Page metadata for history listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: usize, limit: usize, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit.max(1) as u64),
        }
    }
}

/// Response body for GET /api/history
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub passwords: Vec<SecretRecord>,
    pub pagination: Pagination,
}

/// Response body for GET /api/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub total_passwords: u64,
    pub average_length: f64,
    pub average_generation_time_ms: f64,
    /// Record count per strength bucket
    pub strength_distribution: BTreeMap<String, u64>,
    /// Generations since the last clear
    pub total_generated: u64,
    /// Generations since local midnight
    pub generated_today: u64,
}

impl StatsResponse {
    /// Folds per-strength groups into overall figures.
    pub fn from_groups(
        groups: &[GroupSummary],
        total_generated: u64,
        generated_today: u64,
    ) -> Self {
        let total: u64 = groups.iter().map(|g| g.count).sum();
        let weighted = |f: fn(&GroupSummary) -> f64| {
            if total == 0 {
                0.0
            } else {
                groups.iter().map(|g| f(g) * g.count as f64).sum::<f64>() / total as f64
            }
        };

        Self {
            total_passwords: total,
            average_length: weighted(|g| g.average_length),
            average_generation_time_ms: weighted(|g| g.average_generation_time_ms),
            strength_distribution: groups.iter().map(|g| (g.key.clone(), g.count)).collect(),
            total_generated,
            generated_today,
        }
    }
}

/// Response body for GET /api/stats/distribution
#[derive(Debug, Clone, Serialize)]
pub struct DistributionResponse {
    pub group: String,
    pub buckets: Vec<GroupSummary>,
}

/// Response body for DELETE /api/history/:id
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The id that was deleted
    pub id: String,
}

impl DeleteResponse {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            message: format!("Password '{}' deleted successfully", id),
            id,
        }
    }
}

/// Response body for DELETE /api/history
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub deleted: u64,
}

impl ClearResponse {
    pub fn new(deleted: u64) -> Self {
        Self {
            message: format!("Cleared {} passwords", deleted),
            deleted,
        }
    }
}

/// Response body for GET /api/cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub ready: bool,
    pub total_requests: u64,
    pub hits: u64,
    pub misses: u64,
    /// e.g. "75.00%"
    pub hit_rate: String,
    /// Backend-reported memory usage, "N/A" when unavailable
    pub memory_usage: String,
}

impl CacheStatsResponse {
    pub fn new(ready: bool, stats: CacheStats, memory_usage: Option<String>) -> Self {
        Self {
            ready,
            total_requests: stats.total_requests,
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate_display(),
            memory_usage: memory_usage.unwrap_or_else(|| "N/A".to_string()),
        }
    }
}

/// Response body for GET /api/cache/performance
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceResponse {
    pub cache_latency_ms: Option<f64>,
    pub record_store_latency_ms: f64,
    /// e.g. "12.50x", or "N/A"
    pub speedup: String,
}

impl From<PerformanceReport> for PerformanceResponse {
    fn from(report: PerformanceReport) -> Self {
        Self {
            cache_latency_ms: report.cache_latency_ms,
            record_store_latency_ms: report.record_store_latency_ms,
            speedup: report.speedup_display(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Whether the cache backend is currently usable
    pub cache_ready: bool,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(cache_ready: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            cache_ready,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
