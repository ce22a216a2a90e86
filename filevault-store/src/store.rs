//! Filesystem-backed live and quarantine storage areas.

use crate::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Metadata for one live object, used by listing.
#[derive(Clone, Debug)]
pub struct ObjectInfo {
    pub id: String,
    pub size: u64,
    pub created_at: i64,
}

/// Raw envelope blob storage.
///
/// Objects are whole files named by identifier; writes replace the
/// full blob (last-writer-wins, no per-object locking). Quarantined
/// objects are moved, never copied, so a blob exists in exactly one
/// area at a time.
pub struct VaultStore {
    live_dir: PathBuf,
    quarantine_dir: PathBuf,
}

impl VaultStore {
    /// Opens a store, creating both directories if needed.
    pub fn open(live_dir: impl Into<PathBuf>, quarantine_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let live_dir = live_dir.into();
        let quarantine_dir = quarantine_dir.into();
        fs::create_dir_all(&live_dir)?;
        fs::create_dir_all(&quarantine_dir)?;
        Ok(Self {
            live_dir,
            quarantine_dir,
        })
    }

    pub fn live_dir(&self) -> &Path {
        &self.live_dir
    }

    pub fn quarantine_dir(&self) -> &Path {
        &self.quarantine_dir
    }

    /// Writes a full blob, replacing any existing object with the same
    /// identifier.
    pub fn put(&self, id: &str, bytes: &[u8]) -> StoreResult<()> {
        let path = self.live_path(id)?;
        fs::write(&path, bytes)?;
        debug!("stored {} bytes at {}", bytes.len(), path.display());
        Ok(())
    }

    /// Reads a full blob from live storage.
    pub fn get(&self, id: &str) -> StoreResult<Vec<u8>> {
        let path = self.live_path(id)?;
        fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(id.to_string()),
            _ => StoreError::Storage(e.to_string()),
        })
    }

    /// Whether an object exists in live storage.
    pub fn exists(&self, id: &str) -> bool {
        self.live_path(id).map(|p| p.exists()).unwrap_or(false)
    }

    /// Size and creation time of a live object.
    pub fn metadata(&self, id: &str) -> StoreResult<ObjectInfo> {
        let path = self.live_path(id)?;
        let meta = fs::metadata(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(id.to_string()),
            _ => StoreError::Storage(e.to_string()),
        })?;

        let created_at = meta
            .created()
            .or_else(|_| meta.modified())
            .map(|t| DateTime::<Utc>::from(t).timestamp())
            .unwrap_or(0);

        Ok(ObjectInfo {
            id: id.to_string(),
            size: meta.len(),
            created_at,
        })
    }

    /// Moves an object out of live storage into quarantine.
    ///
    /// The destination name is `DESTROYED_<hint>_<id>` so repeated
    /// destructions of re-uploaded objects never collide. Fails with
    /// `NotFound` when the source is already gone; callers in the
    /// destroy protocol tolerate that.
    pub fn relocate(&self, id: &str, rename_hint: &str) -> StoreResult<PathBuf> {
        let source = self.live_path(id)?;
        if !source.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let dest = self.quarantine_dir.join(format!("DESTROYED_{rename_hint}_{id}"));
        fs::rename(&source, &dest)?;
        debug!("relocated {} -> {}", source.display(), dest.display());
        Ok(dest)
    }

    fn live_path(&self, id: &str) -> StoreResult<PathBuf> {
        validate_identifier(id)?;
        Ok(self.live_dir.join(id))
    }
}

/// Rejects identifiers that could escape the storage directory.
fn validate_identifier(id: &str) -> StoreResult<()> {
    if id.is_empty()
        || id == "."
        || id == ".."
        || id.contains('/')
        || id.contains('\\')
        || id.contains('\0')
    {
        return Err(StoreError::InvalidIdentifier(id.to_string()));
    }
    Ok(())
}
