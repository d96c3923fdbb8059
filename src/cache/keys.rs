//! Cache key derivation
//!
//! Keys are `{prefix}:{routePath}` for route-keyed entries (plus any query
//! parameters in sorted order) and `{view}:{param1}:{param2}...` for views
//! with declared parameters.

use std::collections::BTreeMap;

use axum::extract::Query;
use axum::http::Uri;

use super::ROUTE_PREFIX;

// == Cache Policy ==
/// Per-endpoint cache configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    /// Seconds an entry lives after insertion
    pub ttl_secs: u64,
    /// First key segment
    pub key_prefix: String,
    /// Ordered (name, default) pairs; empty means key by route path
    pub params: Vec<(String, String)>,
}

impl CachePolicy {
    /// Route-keyed policy under the default prefix.
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl_secs,
            key_prefix: ROUTE_PREFIX.to_string(),
            params: Vec::new(),
        }
    }

    /// View-keyed policy; add parameters with [`with_param`](Self::with_param).
    pub fn view(view: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            key_prefix: view.into(),
            ..Self::new(ttl_secs)
        }
    }

    /// Appends a key parameter, used in declaration order.
    pub fn with_param(mut self, name: impl Into<String>, default: impl Into<String>) -> Self {
        self.params.push((name.into(), default.into()));
        self
    }

    // == Key For ==
    /// Derives the key for a request URI. Parameter arrival order never matters.
    pub fn key_for(&self, uri: &Uri) -> String {
        let query: BTreeMap<String, String> = Query::<BTreeMap<String, String>>::try_from_uri(uri)
            .map(|Query(map)| map)
            .unwrap_or_default();

        if self.params.is_empty() {
            let mut key = route_key(&self.key_prefix, uri.path());
            for (name, value) in &query {
                key.push_str(&format!(":{}={}", name, value));
            }
            key
        } else {
            let values: Vec<&str> = self
                .params
                .iter()
                .map(|(name, default)| query.get(name).map_or(default.as_str(), String::as_str))
                .collect();
            view_key(&self.key_prefix, &values)
        }
    }
}

/// `{prefix}:{path}`
pub fn route_key(prefix: &str, path: &str) -> String {
    format!("{}:{}", prefix, path)
}

/// `{view}:{p1}:{p2}...`
pub fn view_key(view: &str, params: &[&str]) -> String {
    let mut key = view.to_string();
    for param in params {
        key.push(':');
        key.push_str(param);
    }
    key
}
