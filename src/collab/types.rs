//! Suggestion types
//!
//! Field names on disk follow the suggestion log file format:
//! `suggestion_id`, `content`, `reason`, `urgency`, `timestamp`, `status`,
//! `decided_by`, `decision_reason`, `decided_at`.

use crate::store::record::iso8601;
use crate::store::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How pressing a suggestion is. Unrecognized values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Urgency {
    #[default]
    Low,
    Medium,
    High,
    Other(String),
}

impl From<String> for Urgency {
    fn from(s: String) -> Self {
        match s.as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Urgency {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Urgency> for String {
    fn from(u: Urgency) -> Self {
        u.to_string()
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Lifecycle state. `Pending` is initial; the other two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Accept or reject a pending suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

impl std::str::FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown decision: {} (expected accept or reject)", other)),
        }
    }
}

/// A proposed addition to the shared pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "suggestion_id")]
    pub id: String,
    pub content: String,
    pub reason: Option<String>,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(rename = "timestamp", with = "iso8601")]
    pub created_at: DateTime<Utc>,
    pub status: SuggestionStatus,
    pub decided_by: Option<String>,
    pub decision_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

impl Suggestion {
    pub(crate) fn pending(
        id: String,
        content: &str,
        reason: Option<&str>,
        urgency: Urgency,
    ) -> Self {
        Self {
            id,
            content: content.to_string(),
            reason: reason.map(str::to_string),
            urgency,
            created_at: Utc::now(),
            status: SuggestionStatus::Pending,
            decided_by: None,
            decision_reason: None,
            decided_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SuggestionStatus::Pending
    }

    /// Move to a terminal state. Callers check `is_pending` first.
    pub(crate) fn resolve(&mut self, decision: Decision, identity_id: &str, reason: Option<&str>) {
        self.status = match decision {
            Decision::Accept => SuggestionStatus::Accepted,
            Decision::Reject => SuggestionStatus::Rejected,
        };
        self.decided_by = Some(identity_id.to_string());
        self.decision_reason = reason.map(str::to_string);
        self.decided_at = Some(Utc::now());
    }
}

/// Outcome of resolving a suggestion
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// The suggestion after its transition
    pub suggestion: Suggestion,
    /// Shared record created on accept; `None` on reject
    pub record: Option<Record>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_free_form() {
        assert_eq!(Urgency::from("high"), Urgency::High);
        assert_eq!(Urgency::from("asap"), Urgency::Other("asap".to_string()));
        assert_eq!(serde_json::to_string(&Urgency::Medium).unwrap(), "\"medium\"");
        let parsed: Urgency = serde_json::from_str("\"whenever\"").unwrap();
        assert_eq!(parsed.to_string(), "whenever");
    }

    #[test]
    fn test_decision_parse_is_case_insensitive() {
        assert_eq!("ACCEPT".parse::<Decision>().unwrap(), Decision::Accept);
        assert_eq!("Reject".parse::<Decision>().unwrap(), Decision::Reject);
        assert!("maybe".parse::<Decision>().is_err());
    }

    #[test]
    fn test_suggestion_file_shape() {
        let json = r#"{
            "suggestion_id": "suggest_1",
            "content": "Poetry book about American history",
            "reason": "Central to our collaboration",
            "urgency": "high",
            "timestamp": "2024-02-03T04:05:06.789",
            "status": "accepted",
            "decided_by": "chatgpt",
            "decision_reason": "Relevant"
        }"#;
        let s: Suggestion = serde_json::from_str(json).unwrap();
        assert_eq!(s.id, "suggest_1");
        assert_eq!(s.urgency, Urgency::High);
        assert_eq!(s.status, SuggestionStatus::Accepted);
        assert!(s.decided_at.is_none());

        let out = serde_json::to_value(&s).unwrap();
        assert_eq!(out["suggestion_id"], "suggest_1");
        assert_eq!(out["status"], "accepted");
        assert!(out.get("decided_at").is_none());
        assert!(out.get("id").is_none());
    }

    #[test]
    fn test_resolve_sets_decision_fields() {
        let mut s = Suggestion::pending("suggest_1".to_string(), "x", None, Urgency::Low);
        assert!(s.is_pending());
        s.resolve(Decision::Reject, "deepseek", Some("out of scope"));
        assert_eq!(s.status, SuggestionStatus::Rejected);
        assert_eq!(s.decided_by.as_deref(), Some("deepseek"));
        assert_eq!(s.decision_reason.as_deref(), Some("out of scope"));
        assert!(s.decided_at.is_some());
        assert!(!s.is_pending());
    }
}
