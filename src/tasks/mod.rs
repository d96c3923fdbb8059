//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of the server.
//!
//! # Tasks
//! - Cache writer: performs fire-and-forget cache population after misses
//! - TTL Cleanup: removes expired entries from the in-memory cache backend

mod cache_writer;
mod cleanup;

pub use cache_writer::{spawn_cache_writer, CacheWrite, CacheWriter};
pub use cleanup::spawn_cleanup_task;
