//! Append-only suggestion log with file persistence
//!
//! Suggestions are only ever appended; resolution updates a pending entry in
//! place under the log lock, and terminal entries are kept for audit. The
//! whole log is written as a JSON array in proposal order after each change.

use super::types::{Suggestion, Urgency};
use crate::error::{Error, Result};
use crate::store::persistent::{corrupt, write_atomic};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

/// Id prefix for suggestions
pub const SUGGESTION_ID_PREFIX: &str = "suggest";

struct LogState {
    entries: Vec<Suggestion>,
    next_seq: u64,
}

impl LogState {
    fn allocate_id(&mut self) -> String {
        loop {
            let id = format!("{}_{}", SUGGESTION_ID_PREFIX, self.next_seq);
            self.next_seq += 1;
            if !self.entries.iter().any(|s| s.id == id) {
                return id;
            }
        }
    }
}

/// Ordered, file-backed log of suggestions
///
/// Status transitions only happen through
/// [`CollaborationHub::resolve`](super::CollaborationHub::resolve); the lock
/// guard is not reachable from outside the crate.
///
/// ```compile_fail
/// # async fn transition(log: &memkeep::collab::SuggestionLog) {
/// let mut guard = log.lock().await;
/// # }
/// ```
pub struct SuggestionLog {
    path: PathBuf,
    timeout: Duration,
    state: Mutex<LogState>,
}

impl SuggestionLog {
    /// Open the log, loading `path` if it exists.
    ///
    /// A file that is not a JSON array of suggestions fails with
    /// `CorruptStorage`.
    pub async fn open(path: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let path = path.into();
        let entries: Vec<Suggestion> = match tokio::fs::read(&path).await {
            Ok(data) => serde_json::from_slice(&data).map_err(|e| corrupt(&path, e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(corrupt(&path, e)),
        };
        tracing::debug!("Opened suggestion log {} ({} entries)", path.display(), entries.len());

        let next_seq = entries.len() as u64 + 1;
        Ok(Self {
            path,
            timeout,
            state: Mutex::new(LogState { entries, next_seq }),
        })
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a new pending suggestion and persist the log.
    ///
    /// On `PersistFailed` the suggestion remains in the in-memory log.
    pub async fn append(
        &self,
        content: &str,
        reason: Option<&str>,
        urgency: Urgency,
    ) -> Result<Suggestion> {
        let mut guard = self.lock().await;
        let id = guard.state.allocate_id();
        let suggestion = Suggestion::pending(id, content, reason, urgency);
        guard.state.entries.push(suggestion.clone());
        guard.persist().await?;
        Ok(suggestion)
    }

    /// Take the log lock for a check-then-transition-then-persist sequence
    pub(crate) async fn lock(&self) -> LogGuard<'_> {
        LogGuard {
            log: self,
            state: self.state.lock().await,
        }
    }

    /// Snapshot of every suggestion in proposal order
    pub async fn entries(&self) -> Vec<Suggestion> {
        self.state.lock().await.entries.clone()
    }

    /// Look up one suggestion
    pub async fn get(&self, id: &str) -> Option<Suggestion> {
        self.state
            .lock()
            .await
            .entries
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    /// Write the full log to disk
    pub async fn persist(&self) -> Result<()> {
        self.lock().await.persist().await
    }
}

/// Exclusive access to the log's entries
pub(crate) struct LogGuard<'a> {
    log: &'a SuggestionLog,
    state: MutexGuard<'a, LogState>,
}

impl LogGuard<'_> {
    /// Mutable access to a suggestion that is still pending
    pub(crate) fn pending_mut(&mut self, id: &str) -> Result<&mut Suggestion> {
        let suggestion = self
            .state
            .entries
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::SuggestionNotFound(id.to_string()))?;
        if !suggestion.is_pending() {
            return Err(Error::AlreadyResolved {
                id: id.to_string(),
                status: suggestion.status.to_string(),
            });
        }
        Ok(suggestion)
    }

    /// Write the full log to disk while still holding the lock
    pub(crate) async fn persist(&self) -> Result<()> {
        let data = serde_json::to_vec_pretty(&self.state.entries)?;
        write_atomic(&self.log.path, data, self.log.timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::types::{Decision, SuggestionStatus};
    use tempfile::TempDir;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_append_assigns_ids_in_order() {
        let dir = TempDir::new().unwrap();
        let log = SuggestionLog::open(dir.path().join("log.json"), TIMEOUT).await.unwrap();

        let a = log.append("first", Some("why"), Urgency::High).await.unwrap();
        let b = log.append("second", None, Urgency::Low).await.unwrap();
        assert_eq!(a.id, "suggest_1");
        assert_eq!(b.id, "suggest_2");
        assert_eq!(a.status, SuggestionStatus::Pending);

        let ids: Vec<String> = log.entries().await.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["suggest_1", "suggest_2"]);
    }

    #[tokio::test]
    async fn test_log_persists_as_ordered_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.json");
        {
            let log = SuggestionLog::open(&path, TIMEOUT).await.unwrap();
            log.append("first", None, Urgency::Low).await.unwrap();
            log.append("second", None, Urgency::from("asap")).await.unwrap();
        }

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["suggestion_id"], "suggest_1");
        assert_eq!(raw[1]["urgency"], "asap");

        let log = SuggestionLog::open(&path, TIMEOUT).await.unwrap();
        assert_eq!(log.entries().await.len(), 2);
        let third = log.append("third", None, Urgency::Low).await.unwrap();
        assert_eq!(third.id, "suggest_3");
    }

    #[tokio::test]
    async fn test_pending_mut_errors() {
        let dir = TempDir::new().unwrap();
        let log = SuggestionLog::open(dir.path().join("log.json"), TIMEOUT).await.unwrap();
        log.append("x", None, Urgency::Low).await.unwrap();

        let mut guard = log.lock().await;
        assert!(matches!(guard.pending_mut("suggest_9"), Err(Error::SuggestionNotFound(_))));

        guard
            .pending_mut("suggest_1")
            .unwrap()
            .resolve(Decision::Accept, "alpha", None);
        match guard.pending_mut("suggest_1") {
            Err(Error::AlreadyResolved { status, .. }) => assert_eq!(status, "accepted"),
            other => panic!("expected AlreadyResolved, got {:?}", other.map(|s| s.id.clone())),
        }
    }

    #[tokio::test]
    async fn test_corrupt_log_refuses_to_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, r#"{"not": "a list"}"#).unwrap();
        let result = SuggestionLog::open(&path, TIMEOUT).await;
        assert!(matches!(result, Err(Error::CorruptStorage { .. })));
    }

    #[tokio::test]
    async fn test_failed_append_stays_pending_in_memory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("not-provisioned");
        let path = missing.join("log.json");
        let log = SuggestionLog::open(&path, TIMEOUT).await.unwrap();

        let err = log.append("unsaved", None, Urgency::Low).await.unwrap_err();
        assert!(matches!(err, Error::PersistFailed { .. }));

        let entries = log.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "suggest_1");
        assert!(entries[0].is_pending());

        std::fs::create_dir_all(&missing).unwrap();
        tokio_test::assert_ok!(log.persist().await);
        let reopened = SuggestionLog::open(&path, TIMEOUT).await.unwrap();
        assert!(reopened.get("suggest_1").await.unwrap().is_pending());
    }
}
