//! Cache-aside middleware
//!
//! Wraps idempotent read routes. A hit is answered from the cache without
//! running the handler; a miss runs the handler and, on success, hands the
//! body to the cache writer without waiting for it.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::cache::{CachePolicy, CacheStore, Telemetry};
use crate::tasks::{CacheWrite, CacheWriter};

/// Response header reporting how a wrapped read was served
pub const CACHE_STATUS_HEADER: &str = "x-cache";

// == Cache Aside State ==
/// Middleware state for one wrapped route.
#[derive(Debug, Clone)]
pub struct CacheAside {
    store: CacheStore,
    telemetry: Telemetry,
    writer: CacheWriter,
    policy: CachePolicy,
}

impl CacheAside {
    pub fn new(
        store: CacheStore,
        telemetry: Telemetry,
        writer: CacheWriter,
        policy: CachePolicy,
    ) -> Self {
        Self {
            store,
            telemetry,
            writer,
            policy,
        }
    }
}

// == Middleware ==
/// Serves from the cache on hit, populates it after a successful miss.
///
/// When the store is not ready the call is counted as a miss and passed
/// straight through with no cache write.
pub async fn cache_aside(
    State(layer): State<CacheAside>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return next.run(request).await;
    }

    if !layer.store.is_ready() {
        layer.telemetry.record_miss().await;
        return next.run(request).await;
    }

    let key = layer.policy.key_for(request.uri());

    if let Some(payload) = layer.store.get(&key).await {
        layer.telemetry.record_hit().await;
        debug!(%key, "cache hit");
        return cached_response(payload);
    }

    layer.telemetry.record_miss().await;
    debug!(%key, "cache miss");

    let epoch = layer.store.epoch();
    let response = next.run(request).await;
    if !response.status().is_success() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(%key, error = %e, "failed to buffer response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match std::str::from_utf8(&bytes) {
        Ok(text) => layer.writer.submit(CacheWrite {
            key,
            value: text.to_string(),
            ttl_secs: layer.policy.ttl_secs,
            epoch,
        }),
        Err(_) => debug!(%key, "response body is not utf-8, not cached"),
    }

    Response::from_parts(parts, Body::from(bytes))
}

/// Rebuilds a response from a cached payload, marking it `cached: true`.
fn cached_response(payload: String) -> Response {
    let body = match serde_json::from_str::<serde_json::Value>(&payload) {
        Ok(serde_json::Value::Object(mut object)) => {
            object.insert("cached".to_string(), serde_json::Value::Bool(true));
            serde_json::Value::Object(object).to_string()
        }
        _ => payload,
    };

    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(CACHE_STATUS_HEADER, HeaderValue::from_static("HIT"));
    response
}
