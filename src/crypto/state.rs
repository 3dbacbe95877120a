//! Exportable cipher state for session resumption
//!
//! Wire layout (16 bytes):
//! ```text
//! [ base_nonce (12) | counter_base (2) | counter (2, BE) ]
//! ```
//!
//! The key is not part of the state; it is re-derived from the shared
//! secret when the state is imported.

use crate::core::{
    CryptoError, CryptoResult, CIPHER_STATE_SIZE, COUNTER_BASE_SIZE, NONCE_SIZE,
};

/// Snapshot of a cipher instance's nonce sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherState {
    /// Base nonce from key derivation
    pub base_nonce: [u8; NONCE_SIZE],
    /// Counter base snapshot
    pub counter_base: [u8; COUNTER_BASE_SIZE],
    /// Next counter to consume
    pub counter: u16,
}

impl CipherState {
    /// Serialize to the 16-byte wire layout.
    pub fn to_bytes(&self) -> [u8; CIPHER_STATE_SIZE] {
        let mut out = [0u8; CIPHER_STATE_SIZE];
        out[..NONCE_SIZE].copy_from_slice(&self.base_nonce);
        out[NONCE_SIZE..NONCE_SIZE + COUNTER_BASE_SIZE].copy_from_slice(&self.counter_base);
        out[NONCE_SIZE + COUNTER_BASE_SIZE..].copy_from_slice(&self.counter.to_be_bytes());
        out
    }

    /// Parse the 16-byte wire layout.
    ///
    /// # Errors
    /// Returns `InvalidInput` unless `bytes` is exactly 16 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != CIPHER_STATE_SIZE {
            return Err(CryptoError::InvalidInput(format!(
                "cipher state must be {CIPHER_STATE_SIZE} bytes, got {}",
                bytes.len()
            )));
        }

        let mut base_nonce = [0u8; NONCE_SIZE];
        let mut counter_base = [0u8; COUNTER_BASE_SIZE];
        base_nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
        counter_base.copy_from_slice(&bytes[NONCE_SIZE..NONCE_SIZE + COUNTER_BASE_SIZE]);
        let counter = u16::from_be_bytes([bytes[14], bytes[15]]);

        Ok(Self {
            base_nonce,
            counter_base,
            counter,
        })
    }
}
