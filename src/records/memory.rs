//! In-Memory Record Store
//!
//! Vec-backed record store guarded by a tokio RwLock.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    GroupBy, GroupSummary, RecordFilter, RecordResult, RecordStore, SecretRecord, SortOrder,
};

// == In-Memory Record Store ==
/// Records kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<Vec<SecretRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, record: SecretRecord) -> RecordResult<String> {
        let id = record.id.clone();
        self.records.write().await.push(record);
        Ok(id)
    }

    async fn find(
        &self,
        filter: RecordFilter,
        sort: SortOrder,
        limit: usize,
        skip: usize,
    ) -> RecordResult<Vec<SecretRecord>> {
        let records = self.records.read().await;
        let mut matched: Vec<&SecretRecord> =
            records.iter().filter(|r| filter.matches(r)).collect();

        // Stable sort keeps insertion order for equal timestamps
        match sort {
            SortOrder::NewestFirst => {
                matched.reverse();
                matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            }
            SortOrder::OldestFirst => matched.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }

        Ok(matched.into_iter().skip(skip).take(limit).cloned().collect())
    }

    async fn count(&self, filter: RecordFilter) -> RecordResult<u64> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| filter.matches(r)).count() as u64)
    }

    async fn aggregate(&self, group_by: GroupBy) -> RecordResult<Vec<GroupSummary>> {
        let records = self.records.read().await;
        let mut groups: BTreeMap<String, (u64, f64, f64)> = BTreeMap::new();

        for record in records.iter() {
            let key = match group_by {
                GroupBy::Strength => record.strength.to_string(),
                GroupBy::Length => format!("{:02}", record.length),
            };
            let group = groups.entry(key).or_insert((0, 0.0, 0.0));
            group.0 += 1;
            group.1 += record.length as f64;
            group.2 += record.generation_time_ms;
        }

        Ok(groups
            .into_iter()
            .map(|(key, (count, lengths, times))| GroupSummary {
                key,
                count,
                average_length: lengths / count as f64,
                average_generation_time_ms: times / count as f64,
            })
            .collect())
    }

    async fn delete_by_id(&self, id: &str) -> RecordResult<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }

    async fn delete_all(&self) -> RecordResult<u64> {
        let mut records = self.records.write().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate, CharsetOptions, Strength};
    use crate::records::ClientMetadata;

    fn record(length: usize, options: CharsetOptions) -> SecretRecord {
        SecretRecord::new(generate(length, &options).unwrap(), ClientMetadata::default())
    }

    fn digits() -> CharsetOptions {
        CharsetOptions {
            numbers: true,
            ..CharsetOptions::none()
        }
    }

    #[tokio::test]
    async fn test_insert_and_count() {
        let store = InMemoryRecordStore::new();
        let id = store.insert(record(12, CharsetOptions::default())).await.unwrap();

        assert!(!id.is_empty());
        assert_eq!(store.count(RecordFilter::default()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_newest_first_with_paging() {
        let store = InMemoryRecordStore::new();
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(store.insert(record(12, CharsetOptions::default())).await.unwrap());
        }

        let page = store
            .find(RecordFilter::default(), SortOrder::NewestFirst, 2, 1)
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, ids[3]);
        assert_eq!(page[1].id, ids[2]);
    }

    #[tokio::test]
    async fn test_filter_by_strength() {
        let store = InMemoryRecordStore::new();
        store.insert(record(8, digits())).await.unwrap();
        store.insert(record(20, CharsetOptions::default())).await.unwrap();

        let weak = RecordFilter {
            strength: Some(Strength::Weak),
        };
        assert_eq!(store.count(weak).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_aggregate_by_strength() {
        let store = InMemoryRecordStore::new();
        store.insert(record(8, digits())).await.unwrap();
        store.insert(record(6, digits())).await.unwrap();
        store.insert(record(20, CharsetOptions::default())).await.unwrap();

        let groups = store.aggregate(GroupBy::Strength).await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "Strong");
        assert_eq!(groups[0].count, 1);
        assert_eq!(groups[1].key, "Weak");
        assert_eq!(groups[1].count, 2);
        assert!((groups[1].average_length - 7.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let store = InMemoryRecordStore::new();
        let id = store.insert(record(12, CharsetOptions::default())).await.unwrap();

        assert!(store.delete_by_id(&id).await.unwrap());
        assert!(!store.delete_by_id(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_all() {
        let store = InMemoryRecordStore::new();
        for _ in 0..3 {
            store.insert(record(12, CharsetOptions::default())).await.unwrap();
        }

        assert_eq!(store.delete_all().await.unwrap(), 3);
        assert_eq!(store.count(RecordFilter::default()).await.unwrap(), 0);
    }
}
