//! On-disk backup snapshot (tier 3).

use std::path::{Path, PathBuf};

use super::error::ProviderError;
use super::types::{RawPayload, decode_payload};

/// Default location of the backup file, relative to the working directory.
const DEFAULT_BACKUP_PATH: &str = "fuel_stations_backup.json";

/// Store for the last successfully fetched raw payload.
///
/// The file holds the provider's own schema, so whatever decodes from the
/// live endpoint decodes from here too. Writes are best-effort: a torn
/// write just fails the next load, which the tier chain already tolerates.
#[derive(Debug, Clone)]
pub struct BackupStore {
    path: PathBuf,
}

impl BackupStore {
    /// Create a store at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load and decode the backup payload.
    pub fn load(&self) -> Result<RawPayload, ProviderError> {
        let bytes = std::fs::read(&self.path).map_err(|e| ProviderError::Backup {
            message: format!("failed to read {}: {e}", self.path.display()),
        })?;
        decode_payload(&bytes)
    }

    /// Persist a raw payload, creating parent directories if needed.
    pub fn save(&self, payload: &RawPayload) -> Result<(), ProviderError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ProviderError::Backup {
                message: format!("failed to create backup directory: {e}"),
            })?;
        }

        let json = serde_json::to_string(payload).map_err(|e| ProviderError::Backup {
            message: format!("failed to serialize backup: {e}"),
        })?;

        std::fs::write(&self.path, json).map_err(|e| ProviderError::Backup {
            message: format!("failed to write {}: {e}", self.path.display()),
        })
    }

    /// The backup file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for BackupStore {
    fn default() -> Self {
        Self::new(DEFAULT_BACKUP_PATH)
    }
}
