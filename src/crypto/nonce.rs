//! Counter-derived nonces for AES-128-GCM
//!
//! Each direction owns a 12-byte base nonce. The low two bytes are
//! snapshotted as the counter base; every message restores them and XORs
//! in the big-endian 16-bit counter:
//!
//! ```text
//! [ base_nonce[0..10] | counter_base ^ BE16(counter) ]
//! ```
//!
//! Counters 0 through 0xFFFF give 65536 pairwise distinct nonces. The
//! counter doubles as the per-direction message sequence number, so the
//! transport must deliver each direction in order and without duplicates.

use crate::core::{
    CryptoError, CryptoResult, COUNTER_BASE_SIZE, COUNTER_OFFSET, MAX_COUNTER, NONCE_SIZE,
    NONCE_SPACE,
};

/// Compute the nonce for a given counter value.
///
/// Pure helper behind [`NonceCounter::next_nonce`].
pub(crate) fn construct_nonce(
    base_nonce: &[u8; NONCE_SIZE],
    counter_base: &[u8; COUNTER_BASE_SIZE],
    counter: u16,
) -> [u8; NONCE_SIZE] {
    let mut nonce = *base_nonce;

    // Restore the snapshot, then mix in the counter
    nonce[COUNTER_OFFSET..].copy_from_slice(counter_base);
    let [hi, lo] = counter.to_be_bytes();
    nonce[COUNTER_OFFSET] ^= hi;
    nonce[COUNTER_OFFSET + 1] ^= lo;

    nonce
}

/// Stateful nonce source for one cipher instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceCounter {
    /// Base nonce from key derivation
    base_nonce: [u8; NONCE_SIZE],
    /// Low two bytes of the base nonce, snapshotted at construction
    counter_base: [u8; COUNTER_BASE_SIZE],
    /// Next counter to consume; reaches `NONCE_SPACE` once exhausted
    counter: u32,
}

impl NonceCounter {
    /// Start a fresh sequence at counter 0.
    pub fn new(base_nonce: [u8; NONCE_SIZE]) -> Self {
        let mut counter_base = [0u8; COUNTER_BASE_SIZE];
        counter_base.copy_from_slice(&base_nonce[COUNTER_OFFSET..]);

        Self {
            base_nonce,
            counter_base,
            counter: 0,
        }
    }

    /// Continue a sequence from previously exported values.
    pub fn resume(
        base_nonce: [u8; NONCE_SIZE],
        counter_base: [u8; COUNTER_BASE_SIZE],
        counter: u16,
    ) -> Self {
        Self {
            base_nonce,
            counter_base,
            counter: u32::from(counter),
        }
    }

    /// Get the base nonce.
    pub fn base_nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.base_nonce
    }

    /// Get the counter base snapshot.
    pub fn counter_base(&self) -> &[u8; COUNTER_BASE_SIZE] {
        &self.counter_base
    }

    /// The counter the next call will consume.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Number of nonces still available.
    pub fn remaining(&self) -> u32 {
        NONCE_SPACE - self.counter
    }

    /// Whether every counter value has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.counter > MAX_COUNTER
    }

    /// Consume the current counter and return its nonce.
    ///
    /// # Errors
    /// Returns `NonceExhausted` once counters 0..=0xFFFF are spent. The
    /// counter is left untouched in that case.
    pub fn next_nonce(&mut self) -> CryptoResult<[u8; NONCE_SIZE]> {
        let counter = u16::try_from(self.counter).map_err(|_| CryptoError::NonceExhausted)?;
        let nonce = construct_nonce(&self.base_nonce, &self.counter_base, counter);
        self.counter += 1;
        Ok(nonce)
    }
}
