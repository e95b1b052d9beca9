//! Write-through persistent record store
//!
//! Wraps an inner [`RecordStore`] and writes the full store state to a
//! single JSON file after every mutation, before the call returns:
//!
//! ```text
//! {
//!   "memory_1": { "content": "...", "metadata": {...}, "timestamp": "2024-..." },
//!   ...
//! }
//! ```
//!
//! Hydration happens once in [`PersistentRecordStore::open`]. Nothing here
//! creates directories; see [`crate::system::provision`].

use super::memory::MemoryRecordStore;
use super::record::{Metadata, Record, StoreFile, StoredRecord};
use super::RecordStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// Default bound on a single persistence write
pub const DEFAULT_PERSIST_TIMEOUT: Duration = Duration::from_secs(5);

/// Record store backed by one JSON file, single writer per file
pub struct PersistentRecordStore<S = MemoryRecordStore> {
    inner: S,
    path: PathBuf,
    timeout: Duration,
    /// Serializes mutate-then-persist so the file always reflects a whole write
    write_lock: Mutex<()>,
}

impl PersistentRecordStore<MemoryRecordStore> {
    /// Open a store, hydrating from `path` if it exists.
    ///
    /// A missing file yields an empty store. A file that cannot be read or
    /// is not a well-formed store document fails with `CorruptStorage`.
    pub async fn open(path: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let path = path.into();
        let records = load_store_file(&path).await?;
        tracing::debug!("Opened store {} ({} records)", path.display(), records.len());
        Ok(Self::with_inner(
            MemoryRecordStore::from_records(records),
            path,
            timeout,
        ))
    }
}

impl<S: RecordStore> PersistentRecordStore<S> {
    /// Decorate an existing store. The backing file is not read.
    pub fn with_inner(inner: S, path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            inner,
            path: path.into(),
            timeout,
            write_lock: Mutex::new(()),
        }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full in-memory state to the backing file.
    ///
    /// Callers use this to retry durability after a `PersistFailed`.
    pub async fn persist(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.persist_locked().await
    }

    async fn persist_locked(&self) -> Result<()> {
        let file: StoreFile = self
            .inner
            .records()
            .await
            .iter()
            .map(|r| (r.id.clone(), StoredRecord::from(r)))
            .collect();
        let data = serde_json::to_vec_pretty(&file)?;
        write_atomic(&self.path, data, self.timeout).await?;
        tracing::debug!("Persisted {} records to {}", file.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for PersistentRecordStore<S> {
    async fn store(&self, id: &str, content: &str, metadata: Metadata) -> Result<Record> {
        let _guard = self.write_lock.lock().await;
        let record = self.inner.store(id, content, metadata).await?;
        self.persist_locked().await?;
        Ok(record)
    }

    async fn retrieve(&self, id: &str) -> Option<Record> {
        self.inner.retrieve(id).await
    }

    async fn list_ids(&self) -> Vec<String> {
        self.inner.list_ids().await
    }

    async fn records(&self) -> Vec<Record> {
        self.inner.records().await
    }

    async fn append(&self, prefix: &str, content: &str, metadata: Metadata) -> Result<Record> {
        let _guard = self.write_lock.lock().await;
        let record = self.inner.append(prefix, content, metadata).await?;
        self.persist_locked().await?;
        Ok(record)
    }

    async fn len(&self) -> usize {
        self.inner.len().await
    }
}

/// Read and parse a store file. Missing file → empty.
async fn load_store_file(path: &Path) -> Result<Vec<Record>> {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(corrupt(path, e)),
    };
    let file: StoreFile = serde_json::from_slice(&data).map_err(|e| corrupt(path, e))?;
    Ok(file
        .into_iter()
        .map(|(id, stored)| stored.into_record(id))
        .collect())
}

pub(crate) fn corrupt(path: &Path, reason: impl std::fmt::Display) -> Error {
    tracing::warn!("Refusing corrupt storage {}: {}", path.display(), reason);
    Error::CorruptStorage {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Sequence for temp file names, unique per write within the process
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Sibling temp path for one write: `<file>.<pid>.<seq>.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".{}.{}.tmp", std::process::id(), seq));
    PathBuf::from(tmp)
}

/// Write to a fresh sibling temp file then rename over `path`, bounded by
/// `timeout`.
///
/// A timed-out write may still be running on the blocking pool, so no two
/// writes ever share a temp file.
pub(crate) async fn write_atomic(path: &Path, data: Vec<u8>, timeout: Duration) -> Result<()> {
    let tmp = temp_path(path);

    let write = async {
        tokio::fs::write(&tmp, &data).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok::<_, std::io::Error>(())
    };

    let reason = match tokio::time::timeout(timeout, write).await {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("timed out after {:?}", timeout),
    };
    if let Err(e) = tokio::fs::remove_file(&tmp).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!("Could not remove {}: {}", tmp.display(), e);
        }
    }
    tracing::warn!("Failed to persist {}: {}", path.display(), reason);
    Err(Error::PersistFailed {
        path: path.to_path_buf(),
        reason,
    })
}
