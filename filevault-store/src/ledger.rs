//! Persistent ownership ledger.
//!
//! One JSON document mapping object identifier to owner identity,
//! rewritten wholesale on every mutation. A missing or unparsable
//! document loads as an empty ledger; per-object lookups still fail
//! closed because absence means "no one may access this object".

use crate::{StoreError, StoreResult};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::{debug, warn};

/// Maps stored object identifiers to owner identities.
///
/// All mutations take a process-wide write lock around the whole
/// read-modify-write, so concurrent `record`/`revoke` calls cannot
/// drop each other's updates within this process.
pub struct OwnershipLedger {
    path: Option<PathBuf>,
    entries: RwLock<HashMap<String, String>>,
}

impl OwnershipLedger {
    /// Opens a ledger backed by a JSON document.
    ///
    /// A document that is missing or fails to parse yields an empty
    /// ledger rather than an error — availability over strictness,
    /// since a lost ledger only makes objects inaccessible, never
    /// accessible to the wrong owner.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<HashMap<String, String>>(&bytes) {
                Ok(map) => map,
                Err(e) => {
                    warn!("unparsable ledger document {}, starting empty: {e}", path.display());
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        debug!("ledger loaded with {} entries", entries.len());
        Self {
            path: Some(path),
            entries: RwLock::new(entries),
        }
    }

    /// Opens an in-memory ledger with no backing document (tests and
    /// embedded use).
    pub fn open_in_memory() -> Self {
        Self {
            path: None,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Upserts one entry and persists the full document.
    pub fn record(&self, id: &str, owner: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().unwrap();
        entries.insert(id.to_string(), owner.to_string());
        self.persist(&entries)
    }

    /// Looks up the owner of an object. `None` means no one may
    /// access it.
    pub fn owner_of(&self, id: &str) -> Option<String> {
        self.entries.read().unwrap().get(id).cloned()
    }

    /// Removes one entry and persists. Revoking a missing id is a
    /// no-op.
    pub fn revoke(&self, id: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().unwrap();
        entries.remove(id);
        self.persist(&entries)
    }

    /// Removes a batch of entries with a single persist at the end,
    /// so the visible end-state of a destroy is atomic.
    pub fn revoke_all<I, S>(&self, ids: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = self.entries.write().unwrap();
        for id in ids {
            entries.remove(id.as_ref());
        }
        self.persist(&entries)
    }

    /// All identifiers recorded for `owner`. The destroy protocol's
    /// authoritative worklist.
    pub fn all_owned_by(&self, owner: &str) -> Vec<String> {
        self.entries
            .read()
            .unwrap()
            .iter()
            .filter(|(_, o)| o.as_str() == owner)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Number of entries currently in the ledger.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, entries: &HashMap<String, String>) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let doc = serde_json::to_vec(entries).map_err(|e| StoreError::Storage(e.to_string()))?;
        fs::write(path, doc)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn record_and_lookup() {
        let ledger = OwnershipLedger::open_in_memory();
        ledger.record("a.enc", "a@x.com").unwrap();

        assert_eq!(ledger.owner_of("a.enc").as_deref(), Some("a@x.com"));
        assert_eq!(ledger.owner_of("b.enc"), None);
    }

    #[test]
    fn record_upserts_owner() {
        let ledger = OwnershipLedger::open_in_memory();
        ledger.record("a.enc", "first@x.com").unwrap();
        ledger.record("a.enc", "second@x.com").unwrap();
        assert_eq!(ledger.owner_of("a.enc").as_deref(), Some("second@x.com"));
    }

    #[test]
    fn revoke_is_idempotent() {
        let ledger = OwnershipLedger::open_in_memory();
        ledger.record("a.enc", "a@x.com").unwrap();

        ledger.revoke("a.enc").unwrap();
        assert_eq!(ledger.owner_of("a.enc"), None);

        // Second revoke of the same id must not error
        ledger.revoke("a.enc").unwrap();
        ledger.revoke("never-existed.enc").unwrap();
    }

    #[test]
    fn all_owned_by_filters_by_owner() {
        let ledger = OwnershipLedger::open_in_memory();
        ledger.record("a1.enc", "a@x.com").unwrap();
        ledger.record("a2.enc", "a@x.com").unwrap();
        ledger.record("b1.enc", "b@y.com").unwrap();

        let mut owned = ledger.all_owned_by("a@x.com");
        owned.sort();
        assert_eq!(owned, vec!["a1.enc", "a2.enc"]);
        assert_eq!(ledger.all_owned_by("nobody@z.com").len(), 0);
    }

    #[test]
    fn persists_and_reloads_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");

        {
            let ledger = OwnershipLedger::open(&path);
            ledger.record("a.enc", "a@x.com").unwrap();
            ledger.record("b.enc", "b@y.com").unwrap();
            ledger.revoke("b.enc").unwrap();
        }

        let reloaded = OwnershipLedger::open(&path);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.owner_of("a.enc").as_deref(), Some("a@x.com"));
        assert_eq!(reloaded.owner_of("b.enc"), None);
    }

    #[test]
    fn missing_document_loads_empty() {
        let dir = TempDir::new().unwrap();
        let ledger = OwnershipLedger::open(dir.path().join("does-not-exist.json"));
        assert!(ledger.is_empty());
    }

    #[test]
    fn unparsable_document_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");
        fs::write(&path, b"{ this is not json").unwrap();

        let ledger = OwnershipLedger::open(&path);
        assert!(ledger.is_empty());

        // And a subsequent record rewrites it into a valid document
        ledger.record("a.enc", "a@x.com").unwrap();
        let reloaded = OwnershipLedger::open(&path);
        assert_eq!(reloaded.owner_of("a.enc").as_deref(), Some("a@x.com"));
    }

    #[test]
    fn revoke_all_batches_into_one_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");

        let ledger = OwnershipLedger::open(&path);
        for i in 0..5 {
            ledger.record(&format!("f{i}.enc"), "a@x.com").unwrap();
        }
        ledger.record("keep.enc", "b@y.com").unwrap();

        let ids: Vec<String> = (0..5).map(|i| format!("f{i}.enc")).collect();
        ledger.revoke_all(&ids).unwrap();

        let reloaded = OwnershipLedger::open(&path);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.owner_of("keep.enc").as_deref(), Some("b@y.com"));
    }
}
