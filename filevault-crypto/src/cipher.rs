//! Authenticated encryption with detached tags.
//!
//! AES-256-GCM with a 16-byte IV and a 16-byte authentication tag.
//! The envelope format stores iv, tag and ciphertext as separate
//! fields, so both operations work in detached-tag mode.

use crate::error::{CryptoError, CryptoResult};
use crate::key::DerivedKey;
use aes_gcm::aead::generic_array::typenum::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aes::Aes256;
use aes_gcm::{AeadInPlace, AesGcm, KeyInit};
use rand::RngCore;

/// IV length in bytes.
pub const IV_SIZE: usize = 16;

/// Authentication tag length in bytes.
pub const TAG_SIZE: usize = 16;

/// AES-256-GCM parameterized with the envelope's 16-byte IV.
type VaultCipher = AesGcm<Aes256, U16>;

/// Output of [`seal`]: the pieces the caller assembles into an envelope.
#[derive(Clone, Debug)]
pub struct SealedData {
    pub iv: [u8; IV_SIZE],
    pub tag: [u8; TAG_SIZE],
    pub ciphertext: Vec<u8>,
}

/// Encrypts `plaintext`, generating a fresh random IV per call.
///
/// IV reuse under the same key breaks GCM, so the IV is never a
/// caller input.
pub fn seal(key: &DerivedKey, plaintext: &[u8]) -> CryptoResult<SealedData> {
    let cipher = VaultCipher::new(GenericArray::from_slice(key.as_bytes()));

    let mut iv = [0u8; IV_SIZE];
    rand::rng().fill_bytes(&mut iv);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&iv), b"", &mut buffer)
        .map_err(|_| CryptoError::Encryption("AES-GCM seal failed".into()))?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(tag.as_slice());

    Ok(SealedData {
        iv,
        tag: tag_bytes,
        ciphertext: buffer,
    })
}

/// Decrypts and authenticates; plaintext is only released after the
/// tag verifies.
///
/// All failure modes (wrong key, flipped ciphertext or tag bits)
/// collapse into [`CryptoError::AuthenticationFailure`] so callers
/// cannot distinguish corruption from a bad password.
pub fn open(
    key: &DerivedKey,
    iv: &[u8; IV_SIZE],
    tag: &[u8; TAG_SIZE],
    ciphertext: &[u8],
) -> CryptoResult<Vec<u8>> {
    let cipher = VaultCipher::new(GenericArray::from_slice(key.as_bytes()));

    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(iv),
            b"",
            &mut buffer,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| CryptoError::AuthenticationFailure)?;

    Ok(buffer)
}
