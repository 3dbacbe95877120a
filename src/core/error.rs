//! Error types for the message cipher.

use thiserror::Error;

/// Errors in the crypto layer.
///
/// Split into conditions the caller can ride out (drop the message and carry
/// on) and conditions that end the cipher instance. See
/// [`CryptoError::is_terminal`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The shared secret cannot be used as a MAC key.
    #[error("key derivation failed: shared secret is not usable as a MAC key")]
    KeyDerivationFailed,

    /// Nonce counter exhausted - the session direction must be re-derived.
    #[error("nonce counter exhausted - session direction must be re-derived")]
    NonceExhausted,

    /// GCM tag verification failed (tampered data, wrong key or nonce).
    #[error("authentication failed: GCM tag mismatch")]
    AuthenticationFailed,

    /// Malformed buffer, length or serialized state.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Authentication tag length outside the range GCM supports here.
    /// Raised at construction; the configuration must be fixed.
    #[error("invalid tag length: {0} (expected 12..=16)")]
    InvalidTagLength(usize),
}

impl CryptoError {
    /// Whether the instance that produced this error can no longer be used.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CryptoError::NonceExhausted
                | CryptoError::KeyDerivationFailed
                | CryptoError::InvalidTagLength(_)
        )
    }

    /// Whether the caller may drop the offending message and keep going.
    pub fn is_recoverable(&self) -> bool {
        !self.is_terminal()
    }
}

/// Result alias for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
