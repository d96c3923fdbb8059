//! Cache Store Module
//!
//! Degrading facade over a cache backend. Every operation returns a safe
//! default instead of an error when the backend is missing or failing, and
//! readiness is tracked so callers can skip the cache entirely.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{CacheBackend, CacheError, CacheResult, RedisBackend, RedisBackendConfig};

// == Cache Store ==
/// Shared handle to the cache. Cheap to clone; clones share readiness.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// None when no backend could be connected at startup
    backend: Option<Arc<dyn CacheBackend>>,
    /// Last observed connectivity
    ready: Arc<AtomicBool>,
    /// Bumped by every invalidation; writes captured under an older epoch are stale
    epoch: Arc<AtomicU64>,
}

impl CacheStore {
    // == Constructors ==
    /// Wraps a connected backend.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend: Some(backend),
            ready: Arc::new(AtomicBool::new(true)),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A store with no backend: never ready, every call returns its default.
    pub fn unavailable() -> Self {
        Self {
            backend: None,
            ready: Arc::new(AtomicBool::new(false)),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Connects to Redis, falling back to an unavailable store on failure.
    pub async fn connect_redis(config: RedisBackendConfig) -> Self {
        let url = config.url.clone();
        match RedisBackend::connect(config).await {
            Ok(backend) => {
                info!(url = %url, "connected to redis");
                Self::new(Arc::new(backend))
            }
            Err(e) => {
                warn!(url = %url, error = %e, "redis unavailable, caching disabled");
                Self::unavailable()
            }
        }
    }

    // == Readiness ==
    /// True when a backend exists and its last call did not fail to connect.
    pub fn is_ready(&self) -> bool {
        self.backend.is_some() && self.ready.load(Ordering::Relaxed)
    }

    // == Invalidation Epoch ==
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Marks every value read before this call as stale, returning the new epoch.
    pub fn advance_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn settle<T>(&self, op: &'static str, key: &str, result: CacheResult<T>, default: T) -> T {
        match result {
            Ok(value) => {
                if !self.ready.swap(true, Ordering::Relaxed) {
                    info!("cache backend reachable again");
                }
                value
            }
            Err(e) => {
                if matches!(e, CacheError::Unavailable(_)) {
                    self.ready.store(false, Ordering::Relaxed);
                }
                warn!(op, key, error = %e, "cache operation failed, using default");
                default
            }
        }
    }

    // == Operations ==
    /// Returns None when absent or unreachable.
    pub async fn get(&self, key: &str) -> Option<String> {
        let Some(backend) = &self.backend else {
            return None;
        };
        let result = backend.get(key).await;
        self.settle("get", key, result, None)
    }

    /// Stores `value` for `ttl_secs`; no-op when unreachable.
    pub async fn set(&self, key: &str, value: &str, ttl_secs: u64) {
        if let Err(e) = self.try_set(key, value, ttl_secs).await {
            debug!(key, error = %e, "cache set skipped");
        }
    }

    /// Like [`set`](Self::set) but reports the failure to the caller.
    pub async fn try_set(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        let Some(backend) = &self.backend else {
            return Err(CacheError::Unavailable("no cache backend".to_string()));
        };
        let result = backend.set_ex(key, value, ttl_secs).await;
        match &result {
            Ok(()) => self.ready.store(true, Ordering::Relaxed),
            Err(CacheError::Unavailable(_)) => self.ready.store(false, Ordering::Relaxed),
            Err(_) => {}
        }
        result
    }

    pub async fn delete(&self, key: &str) {
        if let Some(backend) = &self.backend {
            let result = backend.delete(key).await.map(|_| ());
            self.settle("delete", key, result, ());
        }
    }

    /// Deletes every key matching `pattern`, returning the count (0 when unreachable).
    pub async fn delete_matching(&self, pattern: &str) -> usize {
        let Some(backend) = &self.backend else {
            return 0;
        };
        let result = backend.delete_pattern(pattern).await;
        self.settle("delete_pattern", pattern, result, 0)
    }

    pub async fn exists(&self, key: &str) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };
        let result = backend.exists(key).await;
        self.settle("exists", key, result, false)
    }

    /// Atomically increments a counter; 0 when unreachable.
    pub async fn increment(&self, key: &str) -> i64 {
        let Some(backend) = &self.backend else {
            return 0;
        };
        let result = backend.increment(key).await;
        self.settle("increment", key, result, 0)
    }

    /// Sets a new expiry on an existing key; false when absent or unreachable.
    pub async fn expire(&self, key: &str, ttl_secs: u64) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };
        let result = backend.expire(key, ttl_secs).await;
        self.settle("expire", key, result, false)
    }

    /// Remaining seconds; -1 when absent, persistent or unreachable.
    pub async fn remaining_ttl(&self, key: &str) -> i64 {
        let Some(backend) = &self.backend else {
            return -1;
        };
        let result = backend.ttl(key).await.map(|ttl| ttl.max(-1));
        self.settle("ttl", key, result, -1)
    }

    /// Reads an integer counter, treating anything unreadable as zero.
    pub async fn counter(&self, key: &str) -> i64 {
        self.get(key)
            .await
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0)
    }

    /// Human-readable memory usage reported by the backend.
    pub async fn memory_usage(&self) -> Option<String> {
        let backend = self.backend.as_ref()?;
        let result = backend.memory_usage().await.map(Some);
        self.settle("memory_usage", "-", result, None)
    }
}
