//! memkeep - Identity-isolated memory stores with a suggestion-approved shared pool
//!
//! memkeep keeps short, human-readable memories for a set of identities.
//! Each identity owns a private file-backed store that no other identity can
//! read. A separate shared pool is written only through a suggestion
//! workflow: anyone may propose content, and only a registered identity may
//! accept or reject it.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          MemorySystem                            │
//! │  ┌──────────────────────────────┐  ┌──────────────────────────┐  │
//! │  │       IdentityRegistry       │  │    CollaborationHub      │  │
//! │  │  ┌────────┐ ┌────────┐       │  │  propose ─► SuggestionLog │  │
//! │  │  │ alpha  │ │  beta  │  ...  │  │  resolve ─► shared store  │  │
//! │  │  └───┬────┘ └───┬────┘       │  └────────────┬─────────────┘  │
//! │  └──────┼──────────┼────────────┘               │                │
//! │         ▼          ▼                            ▼                │
//! │   SearchableArchive + Classifier      SearchableArchive          │
//! │         │          │                            │                │
//! │   PersistentRecordStore (one JSON file per store, write-through) │
//! │         │          │                            │                │
//! │   MemoryRecordStore (RwLock<HashMap>)                            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`store`]: record store trait, in-memory and persistent stores
//! - [`archive`]: substring search over a store
//! - [`classifier`]: keep/discard verdicts from record metadata
//! - [`identity`]: per-identity isolated memory
//! - [`collab`]: shared pool and suggestion workflow
//! - [`system`]: facade and storage provisioning
//! - [`config`]: configuration management

pub mod archive;
pub mod classifier;
pub mod collab;
pub mod config;
pub mod error;
pub mod identity;
pub mod store;
pub mod system;

pub use config::MemKeepConfig;
pub use error::{Error, Result};
pub use system::{provision, MemorySystem};
