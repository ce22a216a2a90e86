//! The on-disk envelope format.
//!
//! An envelope is the ordered concatenation
//! `salt(16) ‖ iv(16) ‖ tag(16) ‖ ciphertext`, making each stored
//! object self-contained: the password is the only external input
//! needed to open it. Envelopes are immutable once written — the
//! destroy protocol relocates them, never rewrites them.

use crate::cipher::{open, seal, IV_SIZE, TAG_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::key::{derive_key, KdfParams, Salt, SALT_SIZE};

/// Fixed header length: salt + iv + tag.
pub const ENVELOPE_HEADER_SIZE: usize = SALT_SIZE + IV_SIZE + TAG_SIZE;

/// A parsed encrypted blob.
#[derive(Clone, Debug)]
pub struct Envelope {
    pub salt: Salt,
    pub iv: [u8; IV_SIZE],
    pub tag: [u8; TAG_SIZE],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Seals `plaintext` under a fresh random salt derived from
    /// `credential`.
    pub fn seal(plaintext: &[u8], credential: &[u8], params: &KdfParams) -> CryptoResult<Self> {
        let salt = Salt::random();
        let key = derive_key(credential, &salt, params)?;
        let sealed = seal(&key, plaintext)?;
        Ok(Self {
            salt,
            iv: sealed.iv,
            tag: sealed.tag,
            ciphertext: sealed.ciphertext,
        })
    }

    /// Re-derives the key from the embedded salt and opens the
    /// ciphertext. Tag verification happens before any plaintext is
    /// released.
    pub fn open(&self, credential: &[u8], params: &KdfParams) -> CryptoResult<Vec<u8>> {
        let key = derive_key(credential, &self.salt, params)?;
        open(&key, &self.iv, &self.tag, &self.ciphertext)
    }

    /// Parses a raw blob into its envelope fields.
    ///
    /// Anything shorter than the 48-byte header is rejected as
    /// [`CryptoError::CorruptEnvelope`] before any key derivation is
    /// attempted.
    pub fn parse(blob: &[u8]) -> CryptoResult<Self> {
        if blob.len() < ENVELOPE_HEADER_SIZE {
            return Err(CryptoError::CorruptEnvelope {
                expected: ENVELOPE_HEADER_SIZE,
                actual: blob.len(),
            });
        }

        let salt = Salt::from_slice(&blob[..SALT_SIZE])?;
        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(&blob[SALT_SIZE..SALT_SIZE + IV_SIZE]);
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&blob[SALT_SIZE + IV_SIZE..ENVELOPE_HEADER_SIZE]);

        Ok(Self {
            salt,
            iv,
            tag,
            ciphertext: blob[ENVELOPE_HEADER_SIZE..].to_vec(),
        })
    }

    /// Serializes to the `salt ‖ iv ‖ tag ‖ ciphertext` layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ENVELOPE_HEADER_SIZE + self.ciphertext.len());
        out.extend_from_slice(self.salt.as_bytes());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.ciphertext);
        out
    }
}
