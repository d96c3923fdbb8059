//! Cache Entry Module
//!
//! A stored value with its insertion time and absolute expiry, both in Unix
//! milliseconds taken from the backend's clock.

// == Cache Entry ==
/// Represents a single cache entry. Entries are replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The stored payload
    pub value: String,
    /// Insertion timestamp (Unix milliseconds)
    pub inserted_at: i64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<i64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry inserted at `now_ms` with optional TTL in seconds.
    pub fn new(value: String, now_ms: i64, ttl_seconds: Option<u64>) -> Self {
        Self {
            value,
            inserted_at: now_ms,
            expires_at: ttl_seconds.map(|ttl| now_ms + ttl as i64 * 1000),
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now_ms` reaches its expiration time.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }

    /// Sets a new expiry `ttl_seconds` from `now_ms`.
    pub fn expire_in(&mut self, now_ms: i64, ttl_seconds: u64) {
        self.expires_at = Some(now_ms + ttl_seconds as i64 * 1000);
    }

    // == Time To Live ==
    /// Remaining whole seconds, or None if the entry never expires.
    pub fn ttl_remaining(&self, now_ms: i64) -> Option<i64> {
        self.expires_at
            .map(|expires| ((expires - now_ms).max(0) + 999) / 1000)
    }
}
