//! Keep/discard classification of records
//!
//! A record is worth keeping when it is a preference or explicitly marked
//! important. Review is report-only: nothing is ever deleted here.

use crate::store::{Metadata, Record, RecordStore};
use serde::{Deserialize, Serialize};

/// Classifier verdict for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Keep,
    Discard,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keep => write!(f, "KEEP"),
            Self::Discard => write!(f, "DISCARD"),
        }
    }
}

/// One line of a review report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub id: String,
    pub verdict: Verdict,
}

/// Metadata-driven keep/discard classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier;

impl Classifier {
    /// Create a classifier
    pub fn new() -> Self {
        Self
    }

    /// Verdict for a record
    pub fn decide(&self, record: &Record) -> Verdict {
        self.decide_metadata(&record.metadata)
    }

    /// KEEP iff `type == "preference"` or `important` is exactly `true`
    pub fn decide_metadata(&self, metadata: &Metadata) -> Verdict {
        let is_preference = metadata.get("type").and_then(|v| v.as_str()) == Some("preference");
        let is_important = metadata.get("important").and_then(|v| v.as_bool()) == Some(true);
        if is_preference || is_important {
            Verdict::Keep
        } else {
            Verdict::Discard
        }
    }

    /// Verdict for every id in `store`. Does not modify the store.
    pub async fn review_all(&self, store: &dyn RecordStore) -> Vec<ReviewEntry> {
        let mut report = Vec::new();
        for id in store.list_ids().await {
            let verdict = match store.retrieve(&id).await {
                Some(record) => self.decide(&record),
                None => Verdict::Discard,
            };
            tracing::info!(record = %id, %verdict, "Reviewed memory");
            report.push(ReviewEntry { id, verdict });
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRecordStore;
    use serde_json::{json, Value};

    fn metadata(pairs: &[(&str, Value)]) -> Metadata {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_preference_is_kept() {
        let c = Classifier::new();
        assert_eq!(c.decide_metadata(&metadata(&[("type", json!("preference"))])), Verdict::Keep);
    }

    #[test]
    fn test_important_true_is_kept() {
        let c = Classifier::new();
        let m = metadata(&[("type", json!("observation")), ("important", json!(true))]);
        assert_eq!(c.decide_metadata(&m), Verdict::Keep);
    }

    #[test]
    fn test_truthy_but_not_true_is_discarded() {
        let c = Classifier::new();
        for value in [json!("yes"), json!(1), json!("true"), json!([true]), json!(false), Value::Null] {
            let m = metadata(&[("important", value.clone())]);
            assert_eq!(c.decide_metadata(&m), Verdict::Discard, "important = {}", value);
        }
    }

    #[test]
    fn test_missing_or_odd_metadata_is_discarded() {
        let c = Classifier::new();
        assert_eq!(c.decide_metadata(&Metadata::new()), Verdict::Discard);
        assert_eq!(c.decide_metadata(&metadata(&[("type", json!(["preference"]))])), Verdict::Discard);
        assert_eq!(c.decide_metadata(&metadata(&[("type", json!("Preference"))])), Verdict::Discard);
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Keep.to_string(), "KEEP");
        assert_eq!(serde_json::to_string(&Verdict::Discard).unwrap(), "\"DISCARD\"");
    }

    #[tokio::test]
    async fn test_review_all_reports_without_deleting() {
        let store = MemoryRecordStore::new();
        store
            .store("memory_1", "coffee", metadata(&[("type", json!("preference"))]))
            .await
            .unwrap();
        store
            .store("memory_2", "weather", metadata(&[("important", json!("yes"))]))
            .await
            .unwrap();

        let report = Classifier::new().review_all(&store).await;
        assert_eq!(
            report,
            vec![
                ReviewEntry { id: "memory_1".to_string(), verdict: Verdict::Keep },
                ReviewEntry { id: "memory_2".to_string(), verdict: Verdict::Discard },
            ]
        );
        assert_eq!(store.len().await, 2);
    }
}
