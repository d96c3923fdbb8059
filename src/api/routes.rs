//! API Routes
//!
//! Configures the Axum router with all secret service endpoints.

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats_handler, clear_handler, delete_handler, distribution_handler, generate_handler,
    health_handler, history_handler, performance_handler, stats_handler, AppState,
};
use crate::cache::{cache_aside, CacheAside, CachePolicy, HISTORY_VIEW, STATS_VIEW};
use crate::models::requests::DEFAULT_PAGE_SIZE;

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - Cache-aside on the history, stats and distribution reads
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let cached = |policy: CachePolicy| {
        from_fn_with_state(
            CacheAside::new(
                state.cache.clone(),
                state.telemetry.clone(),
                state.writer.clone(),
                policy,
            ),
            cache_aside,
        )
    };

    let history_policy = CachePolicy::view(HISTORY_VIEW, state.config.history_cache_ttl)
        .with_param("limit", DEFAULT_PAGE_SIZE.to_string())
        .with_param("page", "1");
    let stats_policy = CachePolicy::new(state.config.stats_cache_ttl);
    let distribution_policy =
        CachePolicy::view(STATS_VIEW, state.config.stats_cache_ttl).with_param("group", "strength");

    Router::new()
        .route("/api/generate", post(generate_handler))
        .route(
            "/api/history",
            get(history_handler)
                .layer(cached(history_policy))
                .delete(clear_handler),
        )
        .route("/api/history/:id", delete(delete_handler))
        .route("/api/stats", get(stats_handler).layer(cached(stats_policy)))
        .route(
            "/api/stats/distribution",
            get(distribution_handler).layer(cached(distribution_policy)),
        )
        .route("/api/cache/stats", get(cache_stats_handler))
        .route("/api/cache/performance", get(performance_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
