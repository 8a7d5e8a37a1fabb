//! Ordered fallback chain over the raw data sources.

use std::fmt;

use async_trait::async_trait;

use super::backup::BackupStore;
use super::client::ProviderClient;
use super::error::ProviderError;
use super::shell::ShellFetcher;
use super::types::RawPayload;

/// Which fallback tier supplied a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTier {
    /// Tier 1: live HTTP fetch.
    Live,
    /// Tier 2: external curl process.
    Shell,
    /// Tier 3: on-disk backup snapshot.
    Backup,
}

impl SourceTier {
    /// Whether a payload from this tier should refresh the backup file.
    fn refreshes_backup(self) -> bool {
        matches!(self, SourceTier::Live | SourceTier::Shell)
    }
}

impl fmt::Display for SourceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceTier::Live => "live",
            SourceTier::Shell => "shell",
            SourceTier::Backup => "backup",
        };
        f.write_str(name)
    }
}

/// One fetch strategy in the fallback chain.
#[async_trait]
pub trait FetchTier: Send + Sync {
    /// Which tier this strategy represents.
    fn tier(&self) -> SourceTier;

    /// Try to produce a raw payload.
    async fn attempt(&self) -> Result<RawPayload, ProviderError>;
}

#[async_trait]
impl FetchTier for ProviderClient {
    fn tier(&self) -> SourceTier {
        SourceTier::Live
    }

    async fn attempt(&self) -> Result<RawPayload, ProviderError> {
        self.fetch().await
    }
}

#[async_trait]
impl FetchTier for ShellFetcher {
    fn tier(&self) -> SourceTier {
        SourceTier::Shell
    }

    async fn attempt(&self) -> Result<RawPayload, ProviderError> {
        self.fetch().await
    }
}

#[async_trait]
impl FetchTier for BackupStore {
    fn tier(&self) -> SourceTier {
        SourceTier::Backup
    }

    async fn attempt(&self) -> Result<RawPayload, ProviderError> {
        self.load()
    }
}

/// The raw source adapter: tiers attempted strictly in order, each only on
/// failure of the previous.
///
/// A payload with zero records counts as a tier failure so a corrupt source
/// can never empty the canonical dataset downstream. Payloads from the
/// network tiers are persisted to the backup store best-effort, keeping
/// tier 3 fresh over time.
pub struct RawSource {
    tiers: Vec<Box<dyn FetchTier>>,
    backup: Option<BackupStore>,
}

impl RawSource {
    /// Build the standard three-tier chain: live HTTP, curl, disk backup.
    pub fn standard(client: ProviderClient, shell: ShellFetcher, backup: BackupStore) -> Self {
        Self {
            tiers: vec![
                Box::new(client),
                Box::new(shell),
                Box::new(backup.clone()),
            ],
            backup: Some(backup),
        }
    }

    /// Build a chain from explicit tiers (for testing).
    pub fn with_tiers(tiers: Vec<Box<dyn FetchTier>>, backup: Option<BackupStore>) -> Self {
        Self { tiers, backup }
    }

    /// Fetch a raw payload, falling through the tier chain.
    ///
    /// Returns the payload together with the tier that supplied it, or
    /// [`ProviderError::NoSource`] when every tier is exhausted.
    pub async fn fetch_raw(&self) -> Result<(RawPayload, SourceTier), ProviderError> {
        for tier in &self.tiers {
            let label = tier.tier();
            match tier.attempt().await {
                Ok(payload) if payload.is_empty() => {
                    tracing::warn!(tier = %label, "tier produced an empty payload, falling through");
                }
                Ok(payload) => {
                    tracing::info!(tier = %label, records = payload.stations.len(), "raw fetch succeeded");
                    if label.refreshes_backup() {
                        self.persist_backup(&payload);
                    }
                    return Ok((payload, label));
                }
                Err(e) => {
                    tracing::warn!(tier = %label, error = %e, "tier failed, falling through");
                }
            }
        }

        Err(ProviderError::NoSource)
    }

    fn persist_backup(&self, payload: &RawPayload) {
        let Some(backup) = &self.backup else {
            return;
        };
        if let Err(e) = backup.save(payload) {
            // Best-effort only: a failed write just leaves tier 3 staler.
            tracing::warn!(error = %e, path = %backup.path().display(), "failed to persist backup");
        }
    }
}
