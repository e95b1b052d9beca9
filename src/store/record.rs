//! Record data types and the on-disk store file shape

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Arbitrary record metadata
pub type Metadata = HashMap<String, serde_json::Value>;

/// A stored memory record.
///
/// Owned by exactly one store. Overwriting under the same id replaces
/// content, metadata and timestamp together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique within its store
    pub id: String,
    /// Human-readable text
    pub content: String,
    /// Arbitrary key/value metadata
    pub metadata: Metadata,
    /// When the record was (last) written
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Build a record stamped with the current time
    pub fn new(id: impl Into<String>, content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Metadata value as a string, if present and a string
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// On-disk value for one record; the id is the enclosing object key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredRecord {
    pub content: String,
    pub metadata: Metadata,
    #[serde(with = "iso8601")]
    pub timestamp: DateTime<Utc>,
}

/// Whole store file: record id → stored record
pub(crate) type StoreFile = BTreeMap<String, StoredRecord>;

impl StoredRecord {
    pub fn into_record(self, id: String) -> Record {
        Record {
            id,
            content: self.content,
            metadata: self.metadata,
            created_at: self.timestamp,
        }
    }
}

impl From<&Record> for StoredRecord {
    fn from(record: &Record) -> Self {
        Self {
            content: record.content.clone(),
            metadata: record.metadata.clone(),
            timestamp: record.created_at,
        }
    }
}

/// ISO-8601 timestamps.
///
/// Writes RFC 3339 UTC at full precision. Reads RFC 3339, or a
/// timezone-less ISO-8601 datetime which is taken as UTC.
pub(crate) mod iso8601 {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
    }
}
