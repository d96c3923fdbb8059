//! Records Module
//!
//! The record store boundary: secret records, the operations the service
//! needs from durable storage, and a bundled in-memory implementation.

mod memory;

pub use memory::InMemoryRecordStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::generator::{CharsetOptions, GeneratedSecret, Strength};

// == Record Store Error ==
#[derive(Error, Debug)]
pub enum RecordStoreError {
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Record store query failed: {0}")]
    Query(String),
}

pub type RecordResult<T> = std::result::Result<T, RecordStoreError>;

// == Client Metadata ==
/// Opaque request metadata stored with each record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMetadata {
    pub address: String,
    pub user_agent: String,
}

impl Default for ClientMetadata {
    fn default() -> Self {
        Self {
            address: "unknown".to_string(),
            user_agent: "unknown".to_string(),
        }
    }
}

// == Secret Record ==
/// A persisted generation. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretRecord {
    pub id: String,
    pub value: String,
    pub length: usize,
    pub options: CharsetOptions,
    pub strength: Strength,
    pub generation_time_ms: f64,
    pub created_at: DateTime<Utc>,
    pub client: ClientMetadata,
}

impl SecretRecord {
    /// Builds a record from a fresh draw, assigning a new id and timestamp.
    pub fn new(secret: GeneratedSecret, client: ClientMetadata) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            value: secret.value,
            length: secret.length,
            options: secret.options,
            strength: secret.strength,
            generation_time_ms: secret.generation_time_ms,
            created_at: Utc::now(),
            client,
        }
    }
}

// == Query Types ==
/// Record filter; `None` fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub strength: Option<Strength>,
}

impl RecordFilter {
    pub fn matches(&self, record: &SecretRecord) -> bool {
        self.strength.map_or(true, |s| record.strength == s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Field to group by in [`RecordStore::aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Strength,
    Length,
}

/// Metrics computed for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub count: u64,
    pub average_length: f64,
    pub average_generation_time_ms: f64,
}

// == Record Store Trait ==
/// Operations the service needs from the durable record store.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    /// Persists a record and returns its id.
    async fn insert(&self, record: SecretRecord) -> RecordResult<String>;

    async fn find(
        &self,
        filter: RecordFilter,
        sort: SortOrder,
        limit: usize,
        skip: usize,
    ) -> RecordResult<Vec<SecretRecord>>;

    async fn count(&self, filter: RecordFilter) -> RecordResult<u64>;

    /// Groups all records by `group_by`, ordered by group key.
    async fn aggregate(&self, group_by: GroupBy) -> RecordResult<Vec<GroupSummary>>;

    /// Returns false when no record had that id.
    async fn delete_by_id(&self, id: &str) -> RecordResult<bool>;

    /// Removes every record and returns how many were removed.
    async fn delete_all(&self) -> RecordResult<u64>;
}
