//! Invalidation Module
//!
//! Runs after a mutation has been confirmed by the record store and drops
//! every cached read view it could have changed. Best effort: failures are
//! logged by the store and never reach the caller.

use tracing::info;

use crate::cache::{CacheStore, Telemetry, READ_VIEW_PATTERNS};

// == Mutation ==
/// Mutating operations that trigger invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Generate,
    DeleteOne,
    ClearAll,
}

// == Invalidator ==
#[derive(Debug, Clone)]
pub struct Invalidator {
    store: CacheStore,
    telemetry: Telemetry,
}

impl Invalidator {
    pub fn new(store: CacheStore, telemetry: Telemetry) -> Self {
        Self { store, telemetry }
    }

    /// Drops all list and aggregate views for any mutation; a clear also
    /// resets the generation counters. Returns the number of entries removed.
    pub async fn invalidate(&self, mutation: Mutation) -> usize {
        // Advance before deleting so queued writes of older reads are discarded
        self.store.advance_epoch();
        let removed = self.invalidate_read_views().await;

        if mutation == Mutation::ClearAll {
            self.telemetry.reset_generation_counters().await;
        }

        info!(?mutation, removed, "cache invalidated");
        removed
    }

    async fn invalidate_read_views(&self) -> usize {
        let mut removed = 0;
        for pattern in READ_VIEW_PATTERNS {
            removed += self.store.delete_matching(pattern).await;
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{InMemoryBackend, CACHE_HITS_KEY, TOTAL_GENERATED_KEY};
    use crate::clock::SystemClock;
    use std::sync::Arc;

    fn setup() -> (Invalidator, CacheStore, Telemetry) {
        let store = CacheStore::new(Arc::new(InMemoryBackend::default()));
        let telemetry = Telemetry::new(store.clone(), Arc::new(SystemClock));
        (
            Invalidator::new(store.clone(), telemetry.clone()),
            store,
            telemetry,
        )
    }

    async fn seed_views(store: &CacheStore) {
        store.set("history:10:1", "[]", 60).await;
        store.set("history:25:2", "[]", 60).await;
        store.set("cache:/api/stats", "{}", 60).await;
        store.set("stats:length", "{}", 60).await;
    }

    #[tokio::test]
    async fn test_generate_drops_all_read_views() {
        let (invalidator, store, telemetry) = setup();
        seed_views(&store).await;
        telemetry.record_generation().await;
        telemetry.record_hit().await;

        assert_eq!(invalidator.invalidate(Mutation::Generate).await, 4);

        assert!(!store.exists("history:10:1").await);
        assert!(!store.exists("cache:/api/stats").await);
        assert!(!store.exists("stats:length").await);
        // Counters are not read views
        assert!(store.exists(TOTAL_GENERATED_KEY).await);
        assert!(store.exists(CACHE_HITS_KEY).await);
    }

    #[tokio::test]
    async fn test_delete_one_drops_same_views_as_generate() {
        let (invalidator, store, _) = setup();
        seed_views(&store).await;

        assert_eq!(invalidator.invalidate(Mutation::DeleteOne).await, 4);
    }

    #[tokio::test]
    async fn test_every_mutation_advances_epoch() {
        let (invalidator, store, _) = setup();

        invalidator.invalidate(Mutation::Generate).await;
        invalidator.invalidate(Mutation::DeleteOne).await;
        invalidator.invalidate(Mutation::ClearAll).await;

        assert_eq!(store.epoch(), 3);
    }

    #[tokio::test]
    async fn test_clear_all_resets_generation_counters() {
        let (invalidator, store, telemetry) = setup();
        seed_views(&store).await;
        telemetry.record_generation().await;
        telemetry.record_hit().await;

        invalidator.invalidate(Mutation::ClearAll).await;

        assert_eq!(telemetry.generation_counts().await, (0, 0));
        assert_eq!(telemetry.cache_stats().await.hits, 1);
        assert!(!store.exists("history:25:2").await);
    }

    #[tokio::test]
    async fn test_unreachable_store_is_swallowed() {
        let store = CacheStore::unavailable();
        let telemetry = Telemetry::new(store.clone(), Arc::new(SystemClock));
        let invalidator = Invalidator::new(store, telemetry);

        assert_eq!(invalidator.invalidate(Mutation::ClearAll).await, 0);
    }
}
