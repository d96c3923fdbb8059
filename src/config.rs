//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which cache backend the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    Redis,
    Memory,
}

impl FromStr for CacheBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(CacheBackendKind::Redis),
            "memory" => Ok(CacheBackendKind::Memory),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Cache backend selection
    pub cache_backend: CacheBackendKind,
    /// Redis connection URL
    pub redis_url: String,
    /// Initial Redis connection timeout
    pub redis_connect_timeout: Duration,
    /// TTL in seconds for cached history pages
    pub history_cache_ttl: u64,
    /// TTL in seconds for cached statistics
    pub stats_cache_ttl: u64,
    /// In-memory backend cleanup interval in seconds
    pub cleanup_interval: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `REDIS_URL` - Redis URL (default: redis://127.0.0.1:6379)
    /// - `REDIS_CONNECT_TIMEOUT` - Connect timeout in seconds (default: 5)
    /// - `HISTORY_CACHE_TTL` - History cache TTL in seconds (default: 60)
    /// - `STATS_CACHE_TTL` - Statistics cache TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cache_backend: env_or("CACHE_BACKEND", defaults.cache_backend),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            redis_connect_timeout: Duration::from_secs(env_or(
                "REDIS_CONNECT_TIMEOUT",
                defaults.redis_connect_timeout.as_secs(),
            )),
            history_cache_ttl: env_or("HISTORY_CACHE_TTL", defaults.history_cache_ttl),
            stats_cache_ttl: env_or("STATS_CACHE_TTL", defaults.stats_cache_ttl),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache_backend: CacheBackendKind::Redis,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            redis_connect_timeout: Duration::from_secs(5),
            history_cache_ttl: 60,
            stats_cache_ttl: 300,
            cleanup_interval: 1,
        }
    }
}
