//! Shared collaboration pool
//!
//! An outside party proposes content; a registered identity accepts or
//! rejects it. Accepted content is copied into the shared store with
//! provenance metadata.

pub mod hub;
pub mod log;
pub mod types;

pub use hub::CollaborationHub;
pub use log::SuggestionLog;
pub use types::{Decision, Resolution, Suggestion, SuggestionStatus, Urgency};
