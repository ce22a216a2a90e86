//! Vault lifecycle for FileVault.
//!
//! Ties the crypto and storage layers together behind plain function
//! calls: upload seals an envelope and records ownership, download
//! re-derives the key from the envelope's embedded salt after the
//! ownership check passes, and the destroy protocol quarantines every
//! owned object while issuing a recovery token.
//!
//! Transport, identity and delivery are external collaborators; the
//! caller supplies a stable owner identity string per request and an
//! optional [`Notifier`] for destroy hand-offs.

mod config;
mod destroy;
mod notify;

pub use config::{CollisionPolicy, VaultConfig};
pub use destroy::DestroyReport;
pub use filevault_crypto::KdfParams;
pub use filevault_store::ObjectInfo;
pub use notify::{LogNotifier, Notifier, NotifyError, NotifyResult};

use filevault_crypto::{CryptoError, Envelope};
use filevault_store::{OwnershipLedger, StoreError, VaultStore};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// Error types
// ============================================================================

pub type VaultResult<T> = Result<T, VaultError>;

/// Errors surfaced to callers. All are terminal for the single
/// operation — none are transient, nothing is retried.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Ownership mismatch or missing ledger entry; checked before any
    /// decryption attempt.
    #[error("access denied: {0} is not owned by the caller")]
    AccessDenied(String),

    #[error("object not found: {0}")]
    NotFound(String),

    /// Upload target exists and the collision policy is `Reject`.
    #[error("object already exists: {0}")]
    AlreadyExists(String),

    /// Blob too short to contain the envelope header.
    #[error("corrupt envelope ({actual} bytes, need at least {expected})")]
    CorruptEnvelope { expected: usize, actual: usize },

    /// Wrong password, or tampered/corrupted bytes — deliberately
    /// indistinguishable.
    #[error("decryption failed (wrong key)")]
    AuthenticationFailure,

    #[error("invalid object name: {0}")]
    InvalidName(String),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<CryptoError> for VaultError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::AuthenticationFailure => VaultError::AuthenticationFailure,
            CryptoError::CorruptEnvelope { expected, actual } => {
                VaultError::CorruptEnvelope { expected, actual }
            }
            other => VaultError::Crypto(other.to_string()),
        }
    }
}

impl From<StoreError> for VaultError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => VaultError::NotFound(id),
            StoreError::InvalidIdentifier(id) => VaultError::InvalidName(id),
            StoreError::Storage(msg) => VaultError::Storage(msg),
        }
    }
}

impl From<std::io::Error> for VaultError {
    fn from(e: std::io::Error) -> Self {
        VaultError::Storage(e.to_string())
    }
}

// ============================================================================
// Operation results
// ============================================================================

/// Returned by `upload`.
#[derive(Clone, Debug)]
pub struct UploadReceipt {
    /// Identifier of the stored envelope (`<name>.enc`).
    pub id: String,
    pub owner: String,
}

/// Returned by `download`: the decrypted bytes and the display name
/// with the `.enc` suffix stripped.
#[derive(Clone, Debug)]
pub struct DownloadedFile {
    pub name: String,
    pub data: Vec<u8>,
}

// ============================================================================
// Vault — service facade
// ============================================================================

/// A password-per-object encrypted vault.
///
/// Passwords exist only for the duration of a call; every operation
/// re-derives its key and nothing secret is persisted.
pub struct Vault {
    store: VaultStore,
    ledger: OwnershipLedger,
    kdf: KdfParams,
    collision_policy: CollisionPolicy,
    notifier: Arc<dyn Notifier>,
}

impl Vault {
    /// Opens a vault with the default [`LogNotifier`].
    pub fn open(config: VaultConfig) -> VaultResult<Self> {
        Self::with_notifier(config, Arc::new(LogNotifier))
    }

    /// Opens a vault with an injected notification collaborator.
    pub fn with_notifier(config: VaultConfig, notifier: Arc<dyn Notifier>) -> VaultResult<Self> {
        let store = VaultStore::open(&config.live_dir, &config.quarantine_dir)?;
        let ledger = OwnershipLedger::open(&config.ledger_path);
        Ok(Self {
            store,
            ledger,
            kdf: KdfParams::default(),
            collision_policy: config.collision_policy,
            notifier,
        })
    }

    /// Overrides the key-derivation cost parameters.
    ///
    /// Envelopes only open under the parameters they were sealed
    /// with, so this must stay fixed for the lifetime of a storage
    /// area.
    pub fn with_kdf_params(mut self, params: KdfParams) -> Self {
        self.kdf = params;
        self
    }

    /// Encrypts `data` under `credential` and stores it as
    /// `<desired_name>.enc`, recording `owner` in the ledger.
    pub fn upload(
        &self,
        owner: &str,
        credential: &[u8],
        data: &[u8],
        desired_name: &str,
    ) -> VaultResult<UploadReceipt> {
        let id = self.resolve_target_id(desired_name)?;

        let envelope = Envelope::seal(data, credential, &self.kdf)?;
        self.store.put(&id, &envelope.to_bytes())?;
        self.ledger.record(&id, owner)?;

        debug!("uploaded {id} for {owner}");
        Ok(UploadReceipt {
            id,
            owner: owner.to_string(),
        })
    }

    /// Decrypts a stored object for its owner.
    ///
    /// The ownership check runs first, so callers who don't own the
    /// identifier learn nothing — not even whether it exists.
    pub fn download(&self, owner: &str, credential: &[u8], id: &str) -> VaultResult<DownloadedFile> {
        match self.ledger.owner_of(id) {
            Some(recorded) if recorded == owner => {}
            _ => return Err(VaultError::AccessDenied(id.to_string())),
        }

        let blob = self.store.get(id)?;
        let envelope = Envelope::parse(&blob)?;
        let data = envelope.open(credential, &self.kdf)?;

        let name = id.strip_suffix(".enc").unwrap_or(id).to_string();
        Ok(DownloadedFile { name, data })
    }

    /// Lists live objects recorded for `owner`. Ledger entries whose
    /// blob has vanished from live storage are skipped.
    pub fn list_owned(&self, owner: &str) -> VaultResult<Vec<ObjectInfo>> {
        let mut infos = Vec::new();
        for id in self.ledger.all_owned_by(owner) {
            match self.store.metadata(&id) {
                Ok(info) => infos.push(info),
                Err(StoreError::NotFound(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(infos)
    }

    /// Quarantines every object the ledger records for `owner`,
    /// revokes the entries, and issues a recovery token.
    pub fn destroy_vault(&self, owner: &str, credential: &[u8]) -> VaultResult<DestroyReport> {
        destroy::run(
            &self.store,
            &self.ledger,
            self.notifier.as_ref(),
            owner,
            credential,
        )
    }

    /// Picks the final identifier for an upload per the collision
    /// policy.
    fn resolve_target_id(&self, desired_name: &str) -> VaultResult<String> {
        let id = format!("{desired_name}.enc");
        match self.collision_policy {
            CollisionPolicy::Overwrite => Ok(id),
            CollisionPolicy::Reject => {
                if self.store.exists(&id) {
                    Err(VaultError::AlreadyExists(id))
                } else {
                    Ok(id)
                }
            }
            CollisionPolicy::Version => {
                if !self.store.exists(&id) {
                    return Ok(id);
                }
                let mut n = 1u32;
                loop {
                    let candidate = format!("{desired_name}-{n}.enc");
                    if !self.store.exists(&candidate) {
                        return Ok(candidate);
                    }
                    n += 1;
                }
            }
        }
    }
}
