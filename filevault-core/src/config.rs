//! Vault configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What `upload` does when the target identifier already exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Replace the existing object without warning (last-writer-wins).
    #[default]
    Overwrite,
    /// Fail the upload with `AlreadyExists`.
    Reject,
    /// Append a numeric suffix before the `.enc` extension until the
    /// name is free.
    Version,
}

/// Storage layout and upload behavior for a vault.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Directory of live envelope blobs, named by identifier.
    pub live_dir: PathBuf,
    /// Directory destroyed objects are relocated into.
    pub quarantine_dir: PathBuf,
    /// Path of the ownership ledger document.
    pub ledger_path: PathBuf,
    pub collision_policy: CollisionPolicy,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            live_dir: PathBuf::from("storage/live_vaults"),
            quarantine_dir: PathBuf::from("storage/destroyed_vaults"),
            ledger_path: PathBuf::from("storage/metadata.json"),
            collision_policy: CollisionPolicy::Overwrite,
        }
    }
}

impl VaultConfig {
    /// Config rooted under a single base directory, keeping the
    /// default layout.
    pub fn under(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            live_dir: base.join("live_vaults"),
            quarantine_dir: base.join("destroyed_vaults"),
            ledger_path: base.join("metadata.json"),
            collision_policy: CollisionPolicy::Overwrite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_storage_layout() {
        let config = VaultConfig::default();
        assert_eq!(config.live_dir, PathBuf::from("storage/live_vaults"));
        assert_eq!(config.quarantine_dir, PathBuf::from("storage/destroyed_vaults"));
        assert_eq!(config.ledger_path, PathBuf::from("storage/metadata.json"));
        assert_eq!(config.collision_policy, CollisionPolicy::Overwrite);
    }

    #[test]
    fn collision_policy_deserializes_snake_case() {
        let config: VaultConfig =
            serde_json::from_str(r#"{ "collision_policy": "version" }"#).unwrap();
        assert_eq!(config.collision_policy, CollisionPolicy::Version);
    }
}
