//! Notification collaborator seam.
//!
//! Delivery (email, remote archive upload) lives outside the core.
//! The destroy protocol hands the owner, recovery token and archive
//! path to whatever `Notifier` was injected; failures there are
//! logged and swallowed by the caller, never propagated.

use std::path::Path;
use thiserror::Error;
use tracing::info;

pub type NotifyResult<T> = Result<T, NotifyError>;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Receives the outcome of a destroy operation.
pub trait Notifier: Send + Sync {
    fn vault_destroyed(
        &self,
        owner: &str,
        recovery_token: &str,
        archive: &Path,
    ) -> NotifyResult<()>;
}

/// Default notifier: records the hand-off in the log and does nothing
/// else.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn vault_destroyed(
        &self,
        owner: &str,
        recovery_token: &str,
        archive: &Path,
    ) -> NotifyResult<()> {
        info!(
            "vault destroyed for {owner}: token {recovery_token}, archive {}",
            archive.display()
        );
        Ok(())
    }
}
