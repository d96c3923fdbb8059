//! Secret Cache - random secret generation behind a cache-aside read tier
//!
//! Generates secrets from selectable character pools, keeps a history of
//! generations, and serves history and statistics through a Redis-backed
//! cache with pattern invalidation and hit/miss telemetry.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod generator;
pub mod models;
pub mod records;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::{spawn_cache_writer, spawn_cleanup_task};
