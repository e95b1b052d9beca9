//! System facade and storage provisioning

use crate::collab::CollaborationHub;
use crate::config::MemKeepConfig;
use crate::error::Result;
use crate::identity::IdentityRegistry;

/// Create every directory the configured store files live in.
///
/// This is the only place memkeep creates directories; opening stores never
/// touches the filesystem beyond reading their files.
pub async fn provision(config: &MemKeepConfig) -> Result<()> {
    config.validate()?;
    tokio::fs::create_dir_all(&config.storage.base_dir).await?;
    for path in config.all_paths() {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tracing::info!("Provisioned storage at {}", config.storage.base_dir.display());
    Ok(())
}

/// Identity registry plus collaboration hub, opened from one configuration
pub struct MemorySystem {
    registry: IdentityRegistry,
    hub: CollaborationHub,
}

impl MemorySystem {
    /// Open all stores named in `config`
    pub async fn open(config: &MemKeepConfig) -> Result<Self> {
        let registry = IdentityRegistry::open(config).await?;
        let hub = CollaborationHub::open(config).await?;
        Ok(Self { registry, hub })
    }

    /// Per-identity private memory
    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    /// Shared pool and suggestion workflow
    pub fn hub(&self) -> &CollaborationHub {
        &self.hub
    }
}
