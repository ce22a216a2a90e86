//! The destroy protocol.
//!
//! Per-object state machine `Active(owner) -> Quarantined`, run once
//! per invocation over everything the ledger records for the owner.
//! The terminal invariant: no enumerated identifier remains reachable
//! through the ledger afterwards. Relocation failures are tolerated
//! per object; revocation is not optional.
//!
//! Steps 1-4 (enumerate, token, relocate+revoke, persist) are the
//! protocol proper. Step 5 (archive + notification hand-off) is
//! best-effort: its failures are logged and swallowed so destruction
//! completes even when delivery cannot.

use crate::notify::Notifier;
use crate::{VaultError, VaultResult};
use filevault_store::{OwnershipLedger, StoreError, VaultStore};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome reported to the caller, regardless of notification result.
#[derive(Clone, Debug)]
pub struct DestroyReport {
    /// Objects actually relocated into quarantine.
    pub objects_affected: usize,
    /// Opaque audit marker. Not a decryption key; never persisted.
    pub recovery_token: String,
}

pub(crate) fn run(
    store: &VaultStore,
    ledger: &OwnershipLedger,
    notifier: &dyn Notifier,
    owner: &str,
    credential: &[u8],
) -> VaultResult<DestroyReport> {
    // The ledger is the authoritative worklist; live storage has no
    // intrinsic owner field and is never scanned for ownership.
    let worklist = ledger.all_owned_by(owner);
    let destroyed_at = chrono::Utc::now().timestamp();
    let recovery_token = recovery_token(credential, destroyed_at);

    info!("destroying vault for {owner}: {} objects enumerated", worklist.len());

    let hint = destroyed_at.to_string();
    let mut relocated = 0usize;
    for id in &worklist {
        match store.relocate(id, &hint) {
            Ok(dest) => {
                debug!("quarantined {id} as {}", dest.display());
                relocated += 1;
            }
            Err(StoreError::NotFound(_)) => {
                debug!("{id} already absent from live storage, revoking anyway");
            }
            Err(e) => {
                // The entry is still revoked below, which removes the
                // only access path to the blob.
                warn!("failed to quarantine {id}: {e}");
            }
        }
    }

    // One batched persist for the whole end-state.
    ledger.revoke_all(&worklist)?;

    if let Err(e) = archive_and_notify(store, notifier, owner, &recovery_token) {
        warn!("quarantine archive hand-off failed (destruction already complete): {e}");
    }

    Ok(DestroyReport {
        objects_affected: relocated,
        recovery_token,
    })
}

/// `REC-<unixtime>-<first 8 uppercase hex chars of SHA-256(credential)>`.
/// One token covers the whole batch.
fn recovery_token(credential: &[u8], destroyed_at: i64) -> String {
    let digest = Sha256::digest(credential);
    let prefix: String = digest[..4].iter().map(|b| format!("{b:02X}")).collect();
    format!("REC-{destroyed_at}-{prefix}")
}

/// Archives the quarantine area and hands everything to the notifier.
/// The archive file is removed again after a successful hand-off.
fn archive_and_notify(
    store: &VaultStore,
    notifier: &dyn Notifier,
    owner: &str,
    recovery_token: &str,
) -> VaultResult<()> {
    let archive_path = archive_destination(store, owner);
    write_zip_of_dir(store.quarantine_dir(), &archive_path)?;

    match notifier.vault_destroyed(owner, recovery_token, &archive_path) {
        Ok(()) => {
            // Local copy is only needed for the hand-off.
            if let Err(e) = fs::remove_file(&archive_path) {
                warn!("could not remove archive {}: {e}", archive_path.display());
            }
            Ok(())
        }
        Err(e) => Err(VaultError::Storage(e.to_string())),
    }
}

fn archive_destination(store: &VaultStore, owner: &str) -> PathBuf {
    let safe_owner: String = owner
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let parent = store
        .quarantine_dir()
        .parent()
        .unwrap_or_else(|| Path::new("."));
    parent.join(format!("VAULT_BACKUP_{safe_owner}.zip"))
}

fn write_zip_of_dir(dir: &Path, dest: &Path) -> VaultResult<()> {
    let file = fs::File::create(dest)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        zip.start_file(name, options)
            .map_err(|e| VaultError::Storage(e.to_string()))?;
        zip.write_all(&fs::read(entry.path())?)?;
    }

    zip.finish().map_err(|e| VaultError::Storage(e.to_string()))?;
    Ok(())
}
