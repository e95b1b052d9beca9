//! In-memory record store
//!
//! Records live in a `HashMap` behind `tokio::sync::RwLock`, with a
//! side vector remembering insertion order so iteration is stable.

use super::record::{Metadata, Record};
use super::RecordStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Entries {
    records: HashMap<String, Record>,
    order: Vec<String>,
    next_seq: u64,
}

impl Entries {
    fn insert(&mut self, record: Record) {
        if !self.records.contains_key(&record.id) {
            self.order.push(record.id.clone());
        }
        self.records.insert(record.id.clone(), record);
    }

    fn allocate_id(&mut self, prefix: &str) -> String {
        if self.next_seq == 0 {
            self.next_seq = self.records.len() as u64 + 1;
        }
        loop {
            let id = format!("{}_{}", prefix, self.next_seq);
            self.next_seq += 1;
            if !self.records.contains_key(&id) {
                return id;
            }
        }
    }

    fn snapshot(&self) -> Vec<Record> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .cloned()
            .collect()
    }
}

/// In-memory store for records
pub struct MemoryRecordStore {
    entries: Arc<RwLock<Entries>>,
}

impl MemoryRecordStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Entries::default())),
        }
    }

    /// Create a store pre-populated with records, ordered by timestamp then id.
    ///
    /// Timestamps are kept as given.
    pub fn from_records(mut records: Vec<Record>) -> Self {
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        let mut entries = Entries::default();
        for record in records {
            entries.insert(record);
        }
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn store(&self, id: &str, content: &str, metadata: Metadata) -> Result<Record> {
        let record = Record::new(id, content, metadata);
        self.entries.write().await.insert(record.clone());
        Ok(record)
    }

    async fn retrieve(&self, id: &str) -> Option<Record> {
        self.entries.read().await.records.get(id).cloned()
    }

    async fn list_ids(&self) -> Vec<String> {
        self.entries.read().await.order.clone()
    }

    async fn records(&self) -> Vec<Record> {
        self.entries.read().await.snapshot()
    }

    async fn append(&self, prefix: &str, content: &str, metadata: Metadata) -> Result<Record> {
        let mut entries = self.entries.write().await;
        let id = entries.allocate_id(prefix);
        let record = Record::new(id, content, metadata);
        entries.insert(record.clone());
        Ok(record)
    }

    async fn len(&self) -> usize {
        self.entries.read().await.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn meta(kind: &str) -> Metadata {
        let mut m = Metadata::new();
        m.insert("type".to_string(), json!(kind));
        m
    }

    #[tokio::test]
    async fn test_store_and_retrieve() {
        let store = MemoryRecordStore::new();
        store.store("a", "hello", meta("note")).await.unwrap();

        let record = store.retrieve("a").await.unwrap();
        assert_eq!(record.id, "a");
        assert_eq!(record.content, "hello");
        assert_eq!(record.metadata_str("type"), Some("note"));
    }

    #[tokio::test]
    async fn test_retrieve_missing() {
        let store = MemoryRecordStore::new();
        assert!(store.retrieve("nope").await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_and_keeps_slot() {
        let store = MemoryRecordStore::new();
        let first = store.store("a", "one", meta("x")).await.unwrap();
        store.store("b", "two", Metadata::new()).await.unwrap();
        let second = store.store("a", "uno", meta("y")).await.unwrap();

        assert!(second.created_at >= first.created_at);
        let record = store.retrieve("a").await.unwrap();
        assert_eq!(record.content, "uno");
        assert_eq!(record.metadata_str("type"), Some("y"));
        assert_eq!(store.list_ids().await, vec!["a", "b"]);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_list_ids_is_snapshot() {
        let store = MemoryRecordStore::new();
        store.store("a", "one", Metadata::new()).await.unwrap();
        let ids = store.list_ids().await;
        store.store("b", "two", Metadata::new()).await.unwrap();
        assert_eq!(ids, vec!["a"]);
    }

    #[tokio::test]
    async fn test_append_allocates_sequential_ids() {
        let store = MemoryRecordStore::new();
        let a = store.append("memory", "one", Metadata::new()).await.unwrap();
        let b = store.append("memory", "two", Metadata::new()).await.unwrap();
        assert_eq!(a.id, "memory_1");
        assert_eq!(b.id, "memory_2");
    }

    #[tokio::test]
    async fn test_append_skips_taken_ids() {
        let store = MemoryRecordStore::new();
        store.store("memory_2", "manual", Metadata::new()).await.unwrap();

        // Seeded at len + 1 = 2, which is taken
        let next = store.append("memory", "auto", Metadata::new()).await.unwrap();
        assert_eq!(next.id, "memory_3");
        assert_eq!(store.retrieve("memory_2").await.unwrap().content, "manual");
    }

    #[tokio::test]
    async fn test_from_records_orders_by_timestamp() {
        let now = Utc::now();
        let mut late = Record::new("late", "b", Metadata::new());
        late.created_at = now;
        let mut early = Record::new("early", "a", Metadata::new());
        early.created_at = now - Duration::seconds(10);

        let store = MemoryRecordStore::from_records(vec![late.clone(), early.clone()]);
        assert_eq!(store.list_ids().await, vec!["early", "late"]);
        assert_eq!(store.retrieve("late").await.unwrap(), late);
    }
}
