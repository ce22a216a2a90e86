//! Object storage and ownership ledger for FileVault.
//!
//! [`VaultStore`] manages two directories of raw envelope blobs: the
//! live area (named by identifier) and the quarantine area (renamed
//! with a destruction prefix, only ever written by the destroy
//! protocol). [`OwnershipLedger`] is the single source of truth for
//! who may access an object — a blob with no ledger entry is
//! unreachable through the normal paths.

mod ledger;
mod store;

pub use ledger::OwnershipLedger;
pub use store::{ObjectInfo, VaultStore};

use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from the vault store and ledger.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid object identifier: {0}")]
    InvalidIdentifier(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Storage(e.to_string())
    }
}
