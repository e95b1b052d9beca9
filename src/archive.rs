//! Searchable archive over a record store

use crate::error::Result;
use crate::store::{Metadata, Record, RecordStore};
use std::sync::Arc;

/// Save/load pass-through plus case-insensitive substring search
#[derive(Clone)]
pub struct SearchableArchive {
    store: Arc<dyn RecordStore>,
}

impl SearchableArchive {
    /// Wrap a store
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// The wrapped store
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Save a record under `id`
    pub async fn save(&self, id: &str, content: &str, metadata: Metadata) -> Result<Record> {
        self.store.store(id, content, metadata).await
    }

    /// Load a record by id
    pub async fn load(&self, id: &str) -> Option<Record> {
        self.store.retrieve(id).await
    }

    /// Records whose content contains `query`, ignoring case, in store order.
    ///
    /// An empty query matches every record.
    pub async fn search(&self, query: &str) -> Vec<Record> {
        let needle = query.to_lowercase();
        self.store
            .records()
            .await
            .into_iter()
            .filter(|r| r.content.to_lowercase().contains(&needle))
            .collect()
    }

    /// Search when a query is given, otherwise every record
    pub async fn recall(&self, query: Option<&str>) -> Vec<Record> {
        match query {
            Some(q) => self.search(q).await,
            None => self.store.records().await,
        }
    }
}
