//! Collaboration hub: shared store plus the suggestion approval workflow
//!
//! ```text
//!   propose ──► [pending] ──resolve(ACCEPT)──► [accepted] ──► shared record
//!                   │
//!                   └──────resolve(REJECT)──► [rejected]
//! ```
//!
//! Only a registered identity can resolve, and a suggestion resolves at
//! most once.

use super::log::SuggestionLog;
use super::types::{Decision, Resolution, Suggestion, Urgency};
use crate::archive::SearchableArchive;
use crate::classifier::{Classifier, ReviewEntry};
use crate::config::MemKeepConfig;
use crate::error::{Error, Result};
use crate::store::{Metadata, PersistentRecordStore, Record, RecordStore};
use std::collections::HashSet;
use std::sync::Arc;

/// Id prefix for records in the shared store
pub const SHARED_ID_PREFIX: &str = "shared";

/// `suggested_by` metadata on accepted records
pub const EXTERNAL_SUGGESTER: &str = "external";

/// Shared pool guarded by the suggestion workflow
pub struct CollaborationHub {
    shared: Arc<PersistentRecordStore>,
    archive: SearchableArchive,
    classifier: Classifier,
    log: SuggestionLog,
    identities: HashSet<String>,
}

impl CollaborationHub {
    /// Open the shared store and suggestion log named in `config`
    pub async fn open(config: &MemKeepConfig) -> Result<Self> {
        config.validate()?;
        let timeout = config.storage.persist_timeout();

        let shared = Arc::new(
            PersistentRecordStore::open(config.storage.shared_path(), timeout).await?,
        );
        let log = SuggestionLog::open(config.storage.suggestions_path(), timeout).await?;
        let identities = config.identities.iter().map(|i| i.id.clone()).collect();

        Ok(Self {
            archive: SearchableArchive::new(shared.clone()),
            shared,
            classifier: Classifier::new(),
            log,
            identities,
        })
    }

    /// The shared store
    pub fn shared(&self) -> &PersistentRecordStore {
        &self.shared
    }

    /// The suggestion log
    pub fn log(&self) -> &SuggestionLog {
        &self.log
    }

    /// Propose content for the shared pool, returning the suggestion id
    pub async fn propose(
        &self,
        content: &str,
        reason: Option<&str>,
        urgency: Urgency,
    ) -> Result<String> {
        let suggestion = self.log.append(content, reason, urgency).await?;
        tracing::info!(
            suggestion = %suggestion.id,
            urgency = %suggestion.urgency,
            "Memory suggestion recorded"
        );
        Ok(suggestion.id)
    }

    /// Accept or reject a pending suggestion on behalf of `identity_id`.
    ///
    /// The log lock is held from the pending check through persistence, so
    /// concurrent resolutions of one suggestion cannot both succeed. If the
    /// shared store fails to persist on accept, the transition still stands
    /// in memory and the error is returned after the log is written.
    pub async fn resolve(
        &self,
        identity_id: &str,
        suggestion_id: &str,
        decision: Decision,
        reason: Option<&str>,
    ) -> Result<Resolution> {
        if !self.identities.contains(identity_id) {
            return Err(Error::UnknownIdentity(identity_id.to_string()));
        }

        let mut log = self.log.lock().await;
        let suggestion = log.pending_mut(suggestion_id)?;
        suggestion.resolve(decision, identity_id, reason);
        let suggestion = suggestion.clone();

        let record = match decision {
            Decision::Accept => {
                let metadata = provenance(identity_id, suggestion_id, reason);
                let stored = self
                    .shared
                    .append(SHARED_ID_PREFIX, &suggestion.content, metadata)
                    .await;
                let logged = log.persist().await;
                let record = stored?;
                logged?;
                tracing::info!(
                    suggestion = suggestion_id,
                    identity = identity_id,
                    memory = %record.id,
                    "Suggestion accepted"
                );
                Some(record)
            }
            Decision::Reject => {
                log.persist().await?;
                tracing::info!(
                    suggestion = suggestion_id,
                    identity = identity_id,
                    "Suggestion rejected"
                );
                None
            }
        };

        Ok(Resolution { suggestion, record })
    }

    /// Suggestions still awaiting a decision
    pub async fn list_pending(&self) -> Vec<Suggestion> {
        self.log
            .entries()
            .await
            .into_iter()
            .filter(Suggestion::is_pending)
            .collect()
    }

    /// Every suggestion, in proposal order
    pub async fn list_all(&self) -> Vec<Suggestion> {
        self.log.entries().await
    }

    /// One suggestion by id
    pub async fn get(&self, suggestion_id: &str) -> Option<Suggestion> {
        self.log.get(suggestion_id).await
    }

    /// Shared records, filtered by substring when a query is given
    pub async fn list_shared(&self, query: Option<&str>) -> Vec<Record> {
        self.archive.recall(query).await
    }

    /// Keep/discard report over the shared store
    pub async fn review_shared(&self) -> Vec<ReviewEntry> {
        self.classifier.review_all(&*self.shared).await
    }
}

fn provenance(identity_id: &str, suggestion_id: &str, reason: Option<&str>) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("type".to_string(), "collaboration".into());
    metadata.insert("suggested_by".to_string(), EXTERNAL_SUGGESTER.into());
    metadata.insert("accepted_by".to_string(), identity_id.into());
    metadata.insert("acceptance_reason".to_string(), reason.into());
    metadata.insert("source_suggestion".to_string(), suggestion_id.into());
    metadata
}
