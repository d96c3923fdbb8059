//! Cache Writer Task
//!
//! Decouples cache population from the response path. Handlers submit writes
//! to a channel and return immediately; a detached task performs them and
//! logs the outcome, which is never reported to any caller.
//!
//! Each write carries the store epoch observed before its read ran. A write
//! whose epoch has been passed by an invalidation is discarded, and one that
//! raced an invalidation is removed again after landing.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;

/// One pending cache population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheWrite {
    pub key: String,
    pub value: String,
    pub ttl_secs: u64,
    /// `CacheStore::epoch` observed before the payload was read
    pub epoch: u64,
}

/// Sending half handed to the cache-aside middleware.
#[derive(Debug, Clone)]
pub struct CacheWriter {
    tx: mpsc::UnboundedSender<CacheWrite>,
}

impl CacheWriter {
    /// Queues a write without waiting for it.
    pub fn submit(&self, write: CacheWrite) {
        if let Err(e) = self.tx.send(write) {
            warn!(key = %e.0.key, "cache writer stopped, dropping write");
        }
    }
}

/// Spawns the task draining submitted writes into `store`.
///
/// # Returns
/// The sending handle and a JoinHandle that can be aborted during graceful
/// shutdown.
pub fn spawn_cache_writer(store: CacheStore) -> (CacheWriter, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<CacheWrite>();

    let handle = tokio::spawn(async move {
        info!("Starting cache writer task");

        while let Some(write) = rx.recv().await {
            apply(&store, write).await;
        }

        info!("Cache writer task finished");
    });

    (CacheWriter { tx }, handle)
}

async fn apply(store: &CacheStore, write: CacheWrite) {
    if store.epoch() != write.epoch {
        debug!(key = %write.key, "cache write predates invalidation, dropped");
        return;
    }

    if let Err(e) = store.try_set(&write.key, &write.value, write.ttl_secs).await {
        warn!(key = %write.key, error = %e, "cache population failed");
        return;
    }

    // An invalidation between the check and the set may have missed this key
    if store.epoch() != write.epoch {
        store.delete(&write.key).await;
        debug!(key = %write.key, "cache write raced invalidation, removed");
        return;
    }

    debug!(key = %write.key, ttl_secs = write.ttl_secs, "cache populated");
}
