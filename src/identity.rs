//! Identity registry
//!
//! Every identity owns one private persistent store plus the archive and
//! classifier over it. There is no call path from one identity's handle to
//! another identity's store; cross-identity content goes through the
//! collaboration hub.

use crate::archive::SearchableArchive;
use crate::classifier::{Classifier, ReviewEntry};
use crate::config::{IdentityConfig, MemKeepConfig};
use crate::error::{Error, Result};
use crate::store::{Metadata, PersistentRecordStore, Record, RecordStore};
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;

/// Id prefix for memories saved through the registry
pub const MEMORY_ID_PREFIX: &str = "memory";

/// `source` metadata stamped on self-saved memories
pub const AUTONOMOUS_SOURCE: &str = "autonomous";

/// One identity's private memory
pub struct IdentityMemory {
    id: String,
    name: String,
    store: Arc<PersistentRecordStore>,
    archive: SearchableArchive,
    classifier: Classifier,
}

impl IdentityMemory {
    fn new(config: &IdentityConfig, store: PersistentRecordStore) -> Self {
        let store = Arc::new(store);
        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            archive: SearchableArchive::new(store.clone()),
            store,
            classifier: Classifier::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &PersistentRecordStore {
        &self.store
    }

    pub fn archive(&self) -> &SearchableArchive {
        &self.archive
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }
}

/// Identity id → isolated store/archive/classifier
pub struct IdentityRegistry {
    identities: HashMap<String, IdentityMemory>,
}

impl IdentityRegistry {
    /// Open every configured identity's store.
    ///
    /// Fails on invalid configuration or any corrupt backing file.
    pub async fn open(config: &MemKeepConfig) -> Result<Self> {
        config.validate()?;
        let timeout = config.storage.persist_timeout();

        let opened = try_join_all(config.identities.iter().map(|identity| async move {
            let path = config.storage.identity_path(identity);
            let store = PersistentRecordStore::open(path, timeout).await?;
            Ok::<_, Error>(IdentityMemory::new(identity, store))
        }))
        .await?;

        let identities: HashMap<String, IdentityMemory> = opened
            .into_iter()
            .map(|memory| (memory.id.clone(), memory))
            .collect();
        tracing::info!("Opened {} identity stores", identities.len());

        Ok(Self { identities })
    }

    /// Look up an identity
    pub fn get(&self, identity_id: &str) -> Result<&IdentityMemory> {
        self.identities
            .get(identity_id)
            .ok_or_else(|| Error::UnknownIdentity(identity_id.to_string()))
    }

    /// Whether an identity is registered
    pub fn contains(&self, identity_id: &str) -> bool {
        self.identities.contains_key(identity_id)
    }

    /// Registered identity ids, sorted
    pub fn identities(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.identities.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Save a memory into the identity's own store, returning the new id
    pub async fn save_as(
        &self,
        identity_id: &str,
        content: &str,
        memory_type: &str,
        important: bool,
    ) -> Result<String> {
        let memory = self.get(identity_id)?;

        let mut metadata = Metadata::new();
        metadata.insert("type".to_string(), memory_type.into());
        metadata.insert("important".to_string(), important.into());
        metadata.insert("source".to_string(), AUTONOMOUS_SOURCE.into());

        let record = memory
            .store
            .append(MEMORY_ID_PREFIX, content, metadata)
            .await?;
        tracing::debug!(identity = identity_id, memory = %record.id, "Saved memory");
        Ok(record.id)
    }

    /// Recall the identity's memories, optionally filtered by substring
    pub async fn recall_as(&self, identity_id: &str, query: Option<&str>) -> Result<Vec<Record>> {
        Ok(self.get(identity_id)?.archive.recall(query).await)
    }

    /// Keep/discard report over the identity's store
    pub async fn review_as(&self, identity_id: &str) -> Result<Vec<ReviewEntry>> {
        let memory = self.get(identity_id)?;
        Ok(memory.classifier.review_all(&*memory.store).await)
    }
}
