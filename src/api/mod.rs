//! API Module
//!
//! HTTP handlers and routing for the secret service REST API.
//!
//! # Endpoints
//! - `POST /api/generate` - Generate and persist a secret
//! - `GET /api/history` - Paginated history (cached)
//! - `DELETE /api/history` - Clear all history
//! - `DELETE /api/history/:id` - Delete one record
//! - `GET /api/stats` - Aggregate statistics (cached)
//! - `GET /api/stats/distribution` - Grouped statistics (cached)
//! - `GET /api/cache/stats` - Cache hit/miss telemetry
//! - `GET /api/cache/performance` - Cache versus record store latency
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
