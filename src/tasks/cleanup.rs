//! TTL Cleanup Task
//!
//! Background task that periodically removes expired entries from the
//! in-memory cache backend. Redis expires keys on its own.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::InMemoryBackend;

/// Spawns a background task that periodically purges expired cache entries.
///
/// # Arguments
/// * `backend` - shared in-memory backend
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(
    backend: Arc<InMemoryBackend>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            let removed = backend.purge_expired();

            // Log cleanup statistics
            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheBackend;
    use crate::clock::ManualClock;
    use chrono::{Local, TimeZone};

    fn clocked_backend() -> (Arc<InMemoryBackend>, ManualClock) {
        let start = Local
            .with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
            .earliest()
            .unwrap();
        let clock = ManualClock::new(start);
        (Arc::new(InMemoryBackend::new(Arc::new(clock.clone()))), clock)
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let (backend, clock) = clocked_backend();
        backend.set_ex("expire_soon", "value", 1).await.unwrap();
        backend.set_ex("long_lived", "value", 3600).await.unwrap();

        clock.advance(chrono::Duration::seconds(5));
        let handle = spawn_cleanup_task(backend.clone(), 1);

        // Wait for cleanup to run
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(backend.len(), 1, "Expired entry should have been purged");
        assert!(backend.exists("long_lived").await.unwrap());

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let (backend, _) = clocked_backend();

        let handle = spawn_cleanup_task(backend, 1);

        // Abort immediately
        handle.abort();

        // Wait a bit and verify task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
