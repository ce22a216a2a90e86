//! Encryption layer for FileVault.
//!
//! Provides per-object encryption using:
//! - Argon2id for key derivation from passwords
//! - AES-256-GCM for authenticated encryption
//! - Secure key management with zeroization
//!
//! # Architecture
//!
//! Every stored object is a self-contained [`Envelope`]: the Argon2id
//! salt, the AES-GCM IV and authentication tag, and the ciphertext,
//! concatenated in a fixed binary layout. The password is the only
//! input needed to open an envelope — the key is re-derived from the
//! embedded salt on every operation and never persisted.

mod cipher;
mod envelope;
mod error;
mod key;

pub use cipher::{open, seal, SealedData, IV_SIZE, TAG_SIZE};
pub use envelope::{Envelope, ENVELOPE_HEADER_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_key, DerivedKey, KdfParams, Salt, KEY_SIZE, SALT_SIZE};
