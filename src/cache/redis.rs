//! Redis cache backend

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};

use crate::cache::{CacheBackend, CacheError, CacheResult};

/// Configuration for the Redis backend
#[derive(Debug, Clone)]
pub struct RedisBackendConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// How long to wait for the initial connection
    pub connection_timeout: Duration,
    /// Keys requested per SCAN round trip
    pub scan_count: usize,
}

impl Default for RedisBackendConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            connection_timeout: Duration::from_secs(5),
            scan_count: 100,
        }
    }
}

impl RedisBackendConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the connection timeout
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Redis cache backend
///
/// The `ConnectionManager` is cloned per call and reconnects on its own, so a
/// single backend is shared by every request without locking.
#[derive(Clone)]
pub struct RedisBackend {
    connection: ConnectionManager,
    config: RedisBackendConfig,
}

impl fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisBackend")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisBackend {
    /// Opens a managed connection, failing after the configured timeout.
    pub async fn connect(config: RedisBackendConfig) -> CacheResult<Self> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| CacheError::Backend(format!("Failed to create Redis client: {}", e)))?;

        let pending = ConnectionManager::new(client);
        let connection = tokio::time::timeout(config.connection_timeout, pending)
            .await
            .map_err(|_| {
                CacheError::Unavailable(format!(
                    "Timed out connecting to Redis after {:?}",
                    config.connection_timeout
                ))
            })?
            .map_err(|e| classify("connect", &config.url, e))?;

        Ok(Self { connection, config })
    }
}

/// Connection-level failures mean unavailable; anything else is a command error.
fn classify(op: &str, key: &str, e: RedisError) -> CacheError {
    let message = format!("{} '{}': {}", op, key, e);
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Backend(message)
    }
}

/// Pulls `used_memory_human` out of an `INFO memory` reply.
pub(crate) fn parse_used_memory(info: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.strip_prefix("used_memory_human:"))
        .map(|value| value.trim().to_string())
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection.clone();
        conn.get(key).await.map_err(|e| classify("get", key, e))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        conn.set_ex(key, value, ttl_secs.max(1))
            .await
            .map_err(|e| classify("set", key, e))
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.connection.clone();
        let deleted: i64 = conn.del(key).await.map_err(|e| classify("del", key, e))?;
        Ok(deleted > 0)
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<usize> {
        let mut conn = self.connection.clone();

        // SCAN the whole keyspace first, then drop the set in one DEL
        let mut cursor = 0u64;
        let mut keys: Vec<String> = Vec::new();
        loop {
            let (next_cursor, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(self.config.scan_count)
                .query_async(&mut conn)
                .await
                .map_err(|e| classify("scan", pattern, e))?;

            keys.extend(batch);
            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        if keys.is_empty() {
            return Ok(0);
        }
        keys.sort_unstable();
        keys.dedup();

        let deleted: i64 = conn
            .del(&keys)
            .await
            .map_err(|e| classify("del", pattern, e))?;
        Ok(deleted as usize)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.connection.clone();
        conn.exists(key).await.map_err(|e| classify("exists", key, e))
    }

    async fn increment(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.connection.clone();
        conn.incr(key, 1i64)
            .await
            .map_err(|e| classify("incr", key, e))
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> CacheResult<bool> {
        let mut conn = self.connection.clone();
        conn.expire(key, ttl_secs as i64)
            .await
            .map_err(|e| classify("expire", key, e))
    }

    async fn ttl(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.connection.clone();
        conn.ttl(key).await.map_err(|e| classify("ttl", key, e))
    }

    async fn memory_usage(&self) -> CacheResult<String> {
        let mut conn = self.connection.clone();
        let info: String = redis::cmd("INFO")
            .arg("memory")
            .query_async(&mut conn)
            .await
            .map_err(|e| classify("info", "memory", e))?;

        parse_used_memory(&info)
            .ok_or_else(|| CacheError::Backend("INFO reply has no used_memory_human".to_string()))
    }
}
