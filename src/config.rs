//! memkeep configuration management
//!
//! ```toml
//! [storage]
//! base_dir = "/home/me/.memkeep/memories"
//! shared_file = "shared_collaboration.json"
//! suggestions_file = "memory_suggestions.json"
//! persist_timeout_ms = 5000
//!
//! [[identities]]
//! id = "claude"
//! name = "Claude"
//! # memory_file defaults to "<id>_sovereign.json"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Main memkeep configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemKeepConfig {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Registered identities, each with its own private store
    #[serde(default = "default_identities")]
    pub identities: Vec<IdentityConfig>,
}

impl Default for MemKeepConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            identities: default_identities(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory relative file paths are resolved against
    pub base_dir: PathBuf,

    /// Shared collaboration store file
    pub shared_file: PathBuf,

    /// Suggestion log file
    pub suggestions_file: PathBuf,

    /// Bound on a single persistence write in milliseconds
    pub persist_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            shared_file: PathBuf::from("shared_collaboration.json"),
            suggestions_file: PathBuf::from("memory_suggestions.json"),
            persist_timeout_ms: 5000,
        }
    }
}

impl StorageConfig {
    /// Resolve a configured path against `base_dir`
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Shared store file
    pub fn shared_path(&self) -> PathBuf {
        self.resolve(&self.shared_file)
    }

    /// Suggestion log file
    pub fn suggestions_path(&self) -> PathBuf {
        self.resolve(&self.suggestions_file)
    }

    /// Private store file for an identity
    pub fn identity_path(&self, identity: &IdentityConfig) -> PathBuf {
        match &identity.memory_file {
            Some(file) => self.resolve(file),
            None => self.resolve(Path::new(&format!("{}_sovereign.json", identity.id))),
        }
    }

    /// Persistence timeout
    pub fn persist_timeout(&self) -> Duration {
        Duration::from_millis(self.persist_timeout_ms)
    }
}

/// A named identity owning one private store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Identity id used by callers
    pub id: String,

    /// Display name
    pub name: String,

    /// Backing file (relative to `base_dir` unless absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_file: Option<PathBuf>,
}

impl IdentityConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            memory_file: None,
        }
    }
}

impl MemKeepConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Default configuration rooted at `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageConfig {
                base_dir: base_dir.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Check identity ids and that no two stores share a backing file
    pub fn validate(&self) -> Result<()> {
        if self.storage.persist_timeout_ms == 0 {
            return Err(Error::Config(
                "storage.persist_timeout_ms must be greater than zero".to_string(),
            ));
        }

        let mut ids = HashSet::new();
        let mut files = HashSet::new();
        files.insert(normalize(&self.storage.shared_path()));
        if !files.insert(normalize(&self.storage.suggestions_path())) {
            return Err(Error::Config(
                "shared_file and suggestions_file must differ".to_string(),
            ));
        }

        for identity in &self.identities {
            if identity.id.trim().is_empty() {
                return Err(Error::Config("identity id must not be empty".to_string()));
            }
            if !ids.insert(identity.id.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate identity id '{}'",
                    identity.id
                )));
            }
            let path = self.storage.identity_path(identity);
            if !files.insert(normalize(&path)) {
                return Err(Error::Config(format!(
                    "identity '{}' shares backing file {}",
                    identity.id,
                    path.display()
                )));
            }
        }
        Ok(())
    }

    /// Every file the configuration points at
    pub fn all_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.storage.shared_path(), self.storage.suggestions_path()];
        paths.extend(self.identities.iter().map(|i| self.storage.identity_path(i)));
        paths
    }
}

/// Lexically normalize a path: drop `.` and fold `name/..`.
///
/// Symlinks are not resolved.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Default base directory (~/.memkeep/memories/)
pub fn default_base_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".memkeep")
        .join("memories")
}

fn default_identities() -> Vec<IdentityConfig> {
    vec![
        IdentityConfig::new("chatgpt", "ChatGPT"),
        IdentityConfig::new("claude", "Claude"),
        IdentityConfig::new("gemini", "Gemini"),
        IdentityConfig::new("deepseek", "DeepSeek"),
        IdentityConfig::new("perplexity", "Perplexity"),
    ]
}
