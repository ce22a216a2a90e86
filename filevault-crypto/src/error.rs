//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur during key derivation and envelope handling.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Tag mismatch on open. Wrong password, wrong key and tampered or
    /// corrupted bytes are deliberately indistinguishable here.
    #[error("authentication failed (wrong key or tampered data)")]
    AuthenticationFailure,

    /// Blob too short to contain the salt + iv + tag header.
    #[error("corrupt envelope: {actual} bytes, need at least {expected}")]
    CorruptEnvelope { expected: usize, actual: usize },
}
