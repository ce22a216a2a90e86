//! Password-based key derivation.
//!
//! Argon2id turns a password + per-object random salt into a 256-bit
//! key. The parameters are part of the on-disk compatibility contract:
//! changing them makes every existing envelope undecryptable.

use crate::error::{CryptoError, CryptoResult};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Salt length in bytes.
pub const SALT_SIZE: usize = 16;

/// Derived key length in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// Random per-object salt for key derivation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// Generates a fresh cryptographically random salt.
    pub fn random() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds a salt from a slice read out of an envelope header.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != SALT_SIZE {
            return Err(CryptoError::KeyDerivation(format!(
                "invalid salt length: expected {SALT_SIZE}, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; SALT_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

/// Symmetric key derived from (password, salt). Never persisted;
/// zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_SIZE]);

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// Argon2id cost parameters.
///
/// The defaults (19 MiB, 2 iterations, 1 lane) follow current OWASP
/// guidance and are pinned: envelopes sealed under one parameter set
/// can only be opened under the same set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Iteration count.
    pub t_cost: u32,
    /// Parallelism.
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: 19 * 1024,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

/// Derives a symmetric key from a password and salt using Argon2id.
///
/// Deterministic: the same (credential, salt, params) always yields
/// the same key. Pure function of its inputs, no side effects.
pub fn derive_key(
    credential: &[u8],
    salt: &Salt,
    params: &KdfParams,
) -> CryptoResult<DerivedKey> {
    let argon_params = Params::new(params.m_cost, params.t_cost, params.p_cost, Some(KEY_SIZE))
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut out = [0u8; KEY_SIZE];
    argon
        .hash_password_into(credential, salt.as_bytes(), &mut out)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    Ok(DerivedKey(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_same_key() {
        let salt = Salt::random();
        let k1 = derive_key(b"password", &salt, &KdfParams::default()).unwrap();
        let k2 = derive_key(b"password", &salt, &KdfParams::default()).unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn different_salt_different_key() {
        let k1 = derive_key(b"password", &Salt::random(), &KdfParams::default()).unwrap();
        let k2 = derive_key(b"password", &Salt::random(), &KdfParams::default()).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn different_password_different_key() {
        let salt = Salt::random();
        let k1 = derive_key(b"password-a", &salt, &KdfParams::default()).unwrap();
        let k2 = derive_key(b"password-b", &salt, &KdfParams::default()).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn salt_from_slice_rejects_wrong_length() {
        assert!(Salt::from_slice(&[0u8; 15]).is_err());
        assert!(Salt::from_slice(&[0u8; 17]).is_err());
        assert!(Salt::from_slice(&[0u8; 16]).is_ok());
    }
}
