//! Protocol constants for the paired-device secure session.
//!
//! These values are fixed by the protocol and MUST NOT be changed.

// =============================================================================
// CRYPTOGRAPHIC SIZES
// =============================================================================

/// AES-128 key size.
pub const KEY_SIZE: usize = 16;

/// AES-GCM nonce size.
pub const NONCE_SIZE: usize = 12;

/// Size of the counter base snapshot (low two bytes of the base nonce).
pub const COUNTER_BASE_SIZE: usize = 2;

/// Offset of the counter base inside the nonce.
pub const COUNTER_OFFSET: usize = NONCE_SIZE - COUNTER_BASE_SIZE;

/// HMAC-SHA256 output size.
pub const DIGEST_SIZE: usize = 32;

/// Default GCM authentication tag size.
pub const DEFAULT_TAG_SIZE: usize = 16;

/// Smallest GCM tag size accepted by [`CipherConfig`](super::CipherConfig).
pub const MIN_TAG_SIZE: usize = 12;

/// Largest GCM tag size.
pub const MAX_TAG_SIZE: usize = 16;

// =============================================================================
// NONCE COUNTER
// =============================================================================

/// Highest counter value that may be mixed into a nonce.
pub const MAX_COUNTER: u32 = 0xFFFF;

/// Number of distinct nonces one cipher instance can produce.
pub const NONCE_SPACE: u32 = MAX_COUNTER + 1;

// =============================================================================
// EXPORTED STATE
// =============================================================================

/// Exported cipher state: base nonce (12) | counter base (2) | counter (2, BE).
pub const CIPHER_STATE_SIZE: usize = NONCE_SIZE + COUNTER_BASE_SIZE + 2;

/// Exported session state: send state followed by receive state.
pub const SESSION_STATE_SIZE: usize = 2 * CIPHER_STATE_SIZE;

// =============================================================================
// TRAFFIC LABELS
// =============================================================================

/// Client-to-device handshake traffic label.
pub const CLIENT_HS_TRAFFIC: &[u8] = b"ptlsc hs traffic";

/// Device-to-client handshake traffic label.
pub const SERVER_HS_TRAFFIC: &[u8] = b"ptlss hs traffic";

/// Client-to-device application traffic label.
pub const CLIENT_AP_TRAFFIC: &[u8] = b"ptlsc ap traffic";

/// Device-to-client application traffic label.
pub const SERVER_AP_TRAFFIC: &[u8] = b"ptlss ap traffic";
