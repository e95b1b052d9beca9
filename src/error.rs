//! memkeep error types

use std::path::PathBuf;
use thiserror::Error;

/// memkeep error type
#[derive(Error, Debug)]
pub enum Error {
    /// Backing file exists but does not hold valid store data. Fatal at open.
    #[error("Corrupt storage at {}: {reason}", path.display())]
    CorruptStorage { path: PathBuf, reason: String },

    /// Full-state write failed or timed out. The in-memory mutation stands.
    #[error("Persist failed for {}: {reason}", path.display())]
    PersistFailed { path: PathBuf, reason: String },

    /// Identity id not present in the registry
    #[error("Unknown identity: {0}")]
    UnknownIdentity(String),

    /// Suggestion id not present in the log
    #[error("Suggestion not found: {0}")]
    SuggestionNotFound(String),

    /// Suggestion already left the pending state
    #[error("Suggestion {id} already resolved ({status})")]
    AlreadyResolved { id: String, status: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether the caller may retry the failed operation's persistence step
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::PersistFailed { .. })
    }
}

/// Result type alias for memkeep operations
pub type Result<T> = std::result::Result<T, Error>;
