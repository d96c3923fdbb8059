//! API Handlers
//!
//! HTTP request handlers for each secret service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::{
    CacheStore, InMemoryBackend, Invalidator, Mutation, RedisBackendConfig, Telemetry,
};
use crate::clock::{Clock, SystemClock};
use crate::config::{CacheBackendKind, Config};
use crate::error::{AppError, Result};
use crate::generator::{generate, validate};
use crate::models::{
    CacheStatsResponse, ClearResponse, DeleteResponse, DistributionQuery, DistributionResponse,
    GenerateRequest, GenerateResponse, HealthResponse, HistoryQuery, HistoryResponse, Pagination,
    PerformanceResponse, StatsResponse,
};
use crate::records::{
    ClientMetadata, GroupBy, InMemoryRecordStore, RecordFilter, RecordStore, SecretRecord,
    SortOrder,
};
use crate::tasks::{spawn_cache_writer, spawn_cleanup_task, CacheWriter};

/// Application state shared across all handlers.
///
/// Every component holds its own handle on the same cache store; nothing
/// reaches the cache through global state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Durable record store
    pub records: Arc<dyn RecordStore>,
    /// Degrading cache facade
    pub cache: CacheStore,
    pub telemetry: Telemetry,
    pub invalidator: Invalidator,
    /// Handle on the background cache population task
    pub writer: CacheWriter,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the cache-facing components around one store handle.
    pub fn new(
        records: Arc<dyn RecordStore>,
        cache: CacheStore,
        clock: Arc<dyn Clock>,
        writer: CacheWriter,
        config: Config,
    ) -> Self {
        let telemetry = Telemetry::new(cache.clone(), clock);
        let invalidator = Invalidator::new(cache.clone(), telemetry.clone());
        Self {
            records,
            cache,
            telemetry,
            invalidator,
            writer,
            config: Arc::new(config),
        }
    }

    /// Creates AppState from configuration, connecting the selected cache
    /// backend and starting its background tasks.
    ///
    /// Returns the handles of the spawned tasks so they can be aborted on
    /// shutdown.
    pub async fn from_config(config: Config) -> (Self, Vec<JoinHandle<()>>) {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let mut handles = Vec::new();

        let cache = match config.cache_backend {
            CacheBackendKind::Redis => {
                let redis = RedisBackendConfig::new(config.redis_url.clone())
                    .with_connection_timeout(config.redis_connect_timeout);
                CacheStore::connect_redis(redis).await
            }
            CacheBackendKind::Memory => {
                let backend = Arc::new(InMemoryBackend::new(clock.clone()));
                handles.push(spawn_cleanup_task(backend.clone(), config.cleanup_interval));
                CacheStore::new(backend)
            }
        };

        let (writer, writer_handle) = spawn_cache_writer(cache.clone());
        handles.push(writer_handle);

        let records: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
        (Self::new(records, cache, clock, writer, config), handles)
    }
}

/// Reads the caller's address and user agent from proxy-style headers.
pub fn client_metadata(headers: &HeaderMap) -> ClientMetadata {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let address = header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header("x-real-ip"));

    let defaults = ClientMetadata::default();
    ClientMetadata {
        address: address.map(str::to_string).unwrap_or(defaults.address),
        user_agent: header("user-agent").map(str::to_string).unwrap_or(defaults.user_agent),
    }
}

// == Mutating Handlers ==

/// Handler for POST /api/generate
///
/// Generates and persists a secret, then invalidates cached read views and
/// bumps the generation counters.
pub async fn generate_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<GenerateResponse>)> {
    let (length, options) = req.resolve().map_err(AppError::Validation)?;
    validate(length, &options)?;

    let secret = generate(length as usize, &options)?;
    let record = SecretRecord::new(secret, client_metadata(&headers));
    let response = GenerateResponse::new(&record);

    state.records.insert(record).await?;
    state.invalidator.invalidate(Mutation::Generate).await;
    state.telemetry.record_generation().await;

    info!(id = %response.id, strength = %response.strength, length, "secret generated");
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for DELETE /api/history/:id
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.records.delete_by_id(&id).await? {
        return Err(AppError::NotFound(format!("Password '{}' not found", id)));
    }

    state.invalidator.invalidate(Mutation::DeleteOne).await;
    Ok(Json(DeleteResponse::new(id)))
}

/// Handler for DELETE /api/history
///
/// Removes every record, drops all cached views and resets the generation
/// counters.
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let deleted = state.records.delete_all().await?;
    state.invalidator.invalidate(Mutation::ClearAll).await;

    info!(deleted, "history cleared");
    Ok(Json(ClearResponse::new(deleted)))
}

// == Read Handlers ==
// Wrapped by the cache-aside layer in the router.

/// Handler for GET /api/history
pub async fn history_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>> {
    let (page, limit) = query.normalized();
    let filter = RecordFilter::default();
    let skip = (page - 1).saturating_mul(limit);

    let passwords = state
        .records
        .find(filter, SortOrder::NewestFirst, limit, skip)
        .await?;
    let total = state.records.count(filter).await?;

    Ok(Json(HistoryResponse {
        passwords,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// Handler for GET /api/stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let groups = state.records.aggregate(GroupBy::Strength).await?;
    let (total_generated, generated_today) = state.telemetry.generation_counts().await;

    Ok(Json(StatsResponse::from_groups(
        &groups,
        total_generated,
        generated_today,
    )))
}

/// Handler for GET /api/stats/distribution
pub async fn distribution_handler(
    State(state): State<AppState>,
    Query(query): Query<DistributionQuery>,
) -> Result<Json<DistributionResponse>> {
    let group = query.group.unwrap_or_else(|| "strength".to_string());
    let group_by = match group.as_str() {
        "strength" => GroupBy::Strength,
        "length" => GroupBy::Length,
        other => {
            return Err(AppError::Validation(format!(
                "Unknown group '{}', expected 'strength' or 'length'",
                other
            )))
        }
    };

    let buckets = state.records.aggregate(group_by).await?;
    Ok(Json(DistributionResponse { group, buckets }))
}

// == Telemetry Handlers ==

/// Handler for GET /api/cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let stats = state.telemetry.cache_stats().await;
    let memory = state.cache.memory_usage().await;

    Json(CacheStatsResponse::new(state.cache.is_ready(), stats, memory))
}

/// Handler for GET /api/cache/performance
pub async fn performance_handler(
    State(state): State<AppState>,
) -> Result<Json<PerformanceResponse>> {
    let report = state.telemetry.probe(state.records.as_ref()).await?;
    Ok(Json(report.into()))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.is_ready()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Strength;
    use axum::http::HeaderValue;

    fn test_state(cache: CacheStore) -> AppState {
        let (writer, _handle) = spawn_cache_writer(cache.clone());
        AppState::new(
            Arc::new(InMemoryRecordStore::new()),
            cache,
            Arc::new(SystemClock),
            writer,
            Config::default(),
        )
    }

    fn memory_state() -> AppState {
        test_state(CacheStore::new(Arc::new(InMemoryBackend::default())))
    }

    fn request(length: i64, numbers_only: bool) -> GenerateRequest {
        let mut req: GenerateRequest =
            serde_json::from_value(serde_json::json!({ "length": length })).unwrap();
        if numbers_only {
            req.uppercase = Some(false);
            req.lowercase = Some(false);
        }
        req
    }

    #[test]
    fn test_client_metadata_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        headers.insert("x-real-ip", HeaderValue::from_static("192.168.1.1"));
        headers.insert("user-agent", HeaderValue::from_static("curl/8.0"));

        let client = client_metadata(&headers);
        assert_eq!(client.address, "10.0.0.1");
        assert_eq!(client.user_agent, "curl/8.0");
    }

    #[test]
    fn test_client_metadata_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("192.168.1.1"));
        assert_eq!(client_metadata(&headers).address, "192.168.1.1");

        let client = client_metadata(&HeaderMap::new());
        assert_eq!(client, ClientMetadata::default());
    }

    #[tokio::test]
    async fn test_generate_handler_persists_and_counts() {
        let state = memory_state();

        let (status, Json(response)) =
            generate_handler(State(state.clone()), HeaderMap::new(), Json(request(8, true)))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(response.password.len(), 8);
        assert_eq!(response.strength, Strength::Weak);
        assert_eq!(state.records.count(RecordFilter::default()).await.unwrap(), 1);
        assert_eq!(state.telemetry.generation_counts().await, (1, 1));
    }

    #[tokio::test]
    async fn test_generate_handler_rejects_short_length() {
        let state = memory_state();

        let result =
            generate_handler(State(state.clone()), HeaderMap::new(), Json(request(3, false))).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(state.records.count(RecordFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_handler_missing_id() {
        let state = memory_state();

        let result = delete_handler(State(state), Path("missing".to_string())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_history_handler_pages() {
        let state = memory_state();
        for _ in 0..3 {
            generate_handler(State(state.clone()), HeaderMap::new(), Json(request(12, false)))
                .await
                .unwrap();
        }

        let query = HistoryQuery { page: 2, limit: 2 };
        let Json(history) = history_handler(State(state), Query(query)).await.unwrap();

        assert_eq!(history.passwords.len(), 1);
        assert_eq!(history.pagination, Pagination::new(2, 2, 3));
    }

    #[tokio::test]
    async fn test_history_handler_page_past_end() {
        let state = memory_state();
        generate_handler(State(state.clone()), HeaderMap::new(), Json(request(12, false)))
            .await
            .unwrap();

        let query = HistoryQuery {
            page: usize::MAX,
            limit: 100,
        };
        let Json(history) = history_handler(State(state), Query(query)).await.unwrap();

        assert!(history.passwords.is_empty());
        assert_eq!(history.pagination.total, 1);
        assert_eq!(history.pagination.page, usize::MAX);
    }

    #[tokio::test]
    async fn test_distribution_handler_unknown_group() {
        let state = memory_state();
        let query = DistributionQuery {
            group: Some("colour".to_string()),
        };

        let result = distribution_handler(State(state), Query(query)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_health_handler_reports_cache() {
        let Json(up) = health_handler(State(memory_state())).await;
        assert_eq!(up.status, "healthy");
        assert!(up.cache_ready);

        let Json(down) = health_handler(State(test_state(CacheStore::unavailable()))).await;
        assert!(!down.cache_ready);
    }
}
