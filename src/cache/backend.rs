//! Cache Backend Trait
//!
//! Raw key-value operations a cache backend must offer. Errors surface here
//! and are absorbed by [`CacheStore`](super::CacheStore).

use std::fmt::Debug;

use async_trait::async_trait;
use thiserror::Error;

// == Cache Error ==
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Backend cannot be reached
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// Backend answered with an error
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Invalid pattern: {0}")]
    Pattern(String),
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;

// == Cache Backend ==
/// Key-value service with expiry, pattern deletes and atomic counters.
#[async_trait]
pub trait CacheBackend: Send + Sync + Debug {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value`, replacing any existing entry, expiring `ttl_secs` from now.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()>;

    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Deletes every key matching a glob pattern, returning how many went.
    async fn delete_pattern(&self, pattern: &str) -> CacheResult<usize>;

    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Atomically adds one, creating the counter at zero first if needed.
    async fn increment(&self, key: &str) -> CacheResult<i64>;

    /// Sets the expiry of an existing key. Returns false if the key is absent.
    async fn expire(&self, key: &str, ttl_secs: u64) -> CacheResult<bool>;

    /// Remaining seconds; -2 if absent, -1 if the key never expires.
    async fn ttl(&self, key: &str) -> CacheResult<i64>;

    /// Human-readable memory usage, e.g. `1.05M`.
    async fn memory_usage(&self) -> CacheResult<String>;
}
