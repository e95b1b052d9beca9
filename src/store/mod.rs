//! Record stores
//!
//! [`RecordStore`] is the minimal capability every layer builds on.
//! [`MemoryRecordStore`] keeps records in memory; [`PersistentRecordStore`]
//! decorates any inner store with write-through file durability.

pub mod memory;
pub mod persistent;
pub mod record;

pub use memory::MemoryRecordStore;
pub use persistent::PersistentRecordStore;
pub use record::{Metadata, Record};

use crate::error::Result;
use async_trait::async_trait;

/// Keyed collection of records with unique ids
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or overwrite the record under `id`, stamping the current time
    async fn store(&self, id: &str, content: &str, metadata: Metadata) -> Result<Record>;

    /// Fetch a record by id
    async fn retrieve(&self, id: &str) -> Option<Record>;

    /// Snapshot of all ids in iteration order
    async fn list_ids(&self) -> Vec<String>;

    /// Snapshot of all records in iteration order
    async fn records(&self) -> Vec<Record>;

    /// Store under the next free `{prefix}_{n}` id.
    ///
    /// Id allocation and insertion happen under one write lock, so
    /// concurrent appends never hand out the same id.
    async fn append(&self, prefix: &str, content: &str, metadata: Metadata) -> Result<Record>;

    /// Number of records
    async fn len(&self) -> usize {
        self.list_ids().await.len()
    }

    /// Whether the store holds no records
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
