//! In-Memory Cache Backend
//!
//! Process-local backend with the same semantics as the networked one:
//! absolute expiry, glob deletes, atomic counters. Used for local runs and
//! tests, and able to simulate an unreachable server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use regex::Regex;

use crate::cache::{CacheBackend, CacheEntry, CacheError, CacheResult};
use crate::clock::{Clock, SystemClock};

// == In-Memory Backend ==
#[derive(Debug)]
pub struct InMemoryBackend {
    /// Key-value storage
    entries: Mutex<HashMap<String, CacheEntry>>,
    /// Time source for expiry
    clock: Arc<dyn Clock>,
    /// When false every call fails as if the server were down
    reachable: AtomicBool,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl InMemoryBackend {
    // == Constructor ==
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            reachable: AtomicBool::new(true),
        }
    }

    /// Simulates the server going down or coming back.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_reachable(&self) -> CacheResult<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Unavailable("in-memory backend offline".to_string()))
        }
    }

    /// Locks the map after dropping the entry under `key` if it has expired.
    fn live_entries(&self, key: &str) -> (MutexGuard<'_, HashMap<String, CacheEntry>>, i64) {
        let now = self.clock.now_ms();
        let mut entries = self.lock();
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        (entries, now)
    }
}

#[async_trait]
impl CacheBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check_reachable()?;
        let (entries, _) = self.live_entries(key);
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        self.check_reachable()?;
        let now = self.clock.now_ms();
        let entry = CacheEntry::new(value.to_string(), now, Some(ttl_secs.max(1)));
        self.lock().insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        self.check_reachable()?;
        let (mut entries, _) = self.live_entries(key);
        Ok(entries.remove(key).is_some())
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<usize> {
        self.check_reachable()?;
        let matcher = glob_to_regex(pattern)?;

        // Collect and remove under one lock so the set goes atomically
        let mut entries = self.lock();
        let matched: Vec<String> = entries
            .keys()
            .filter(|key| matcher.is_match(key))
            .cloned()
            .collect();
        for key in &matched {
            entries.remove(key);
        }

        Ok(matched.len())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        self.check_reachable()?;
        let (entries, _) = self.live_entries(key);
        Ok(entries.contains_key(key))
    }

    async fn increment(&self, key: &str) -> CacheResult<i64> {
        self.check_reachable()?;
        let (mut entries, now) = self.live_entries(key);

        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| CacheEntry::new("0".to_string(), now, None));
        let current: i64 = entry.value.parse().map_err(|_| {
            CacheError::Backend(format!("value at '{}' is not an integer", key))
        })?;

        // Expiry is kept, matching INCR on a volatile key
        let next = current + 1;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> CacheResult<bool> {
        self.check_reachable()?;
        let (mut entries, now) = self.live_entries(key);
        match entries.get_mut(key) {
            Some(entry) => {
                entry.expire_in(now, ttl_secs);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> CacheResult<i64> {
        self.check_reachable()?;
        let (entries, now) = self.live_entries(key);
        Ok(match entries.get(key) {
            Some(entry) => entry.ttl_remaining(now).unwrap_or(-1),
            None => -2,
        })
    }

    async fn memory_usage(&self) -> CacheResult<String> {
        self.check_reachable()?;
        let bytes: usize = self
            .lock()
            .iter()
            .map(|(key, entry)| key.len() + entry.value.len())
            .sum();
        Ok(human_bytes(bytes))
    }
}

// == Utility Functions ==
/// Compiles a glob with `*` and `?` wildcards into an anchored regex.
pub(crate) fn glob_to_regex(pattern: &str) -> CacheResult<Regex> {
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push('^');
    for c in pattern.chars() {
        match c {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            other => source.push_str(&regex::escape(&other.to_string())),
        }
    }
    source.push('$');

    Regex::new(&source).map_err(|e| CacheError::Pattern(format!("{}: {}", pattern, e)))
}

/// Formats a byte count the way the server's INFO command does.
fn human_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["K", "M", "G", "T"];
    if bytes < 1024 {
        return format!("{}B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{:.2}{}", value, unit)
}
