//! Security layer: key derivation, counter nonces and AES-128-GCM.
//!
//! Data flow for one session direction:
//!
//! ```text
//! shared secret + label + context
//!         │ HMAC-SHA256
//!         ▼
//!   key ─────────────┐
//!   base nonce ─► NonceCounter ─► nonce ─► GcmCipher ─► ciphertext || tag
//! ```
//!
//! [`CipherState`] exports and restores the nonce sequence so a direction
//! can survive a restart without replaying a nonce.
//!
//! Raw GCM with a caller-chosen nonce is not exposed; every encryption goes
//! through a counter-driven [`MessageCipher`]:
//!
//! ```compile_fail
//! use ptls_cipher::crypto::GcmCipher;
//! ```

mod aead;
mod cipher;
mod kdf;
mod nonce;
mod session;
mod state;

pub(crate) use aead::GcmCipher;
pub use cipher::{MessageCipher, Mode};
pub use kdf::{derive_keys, CipherKey, DerivedKeys};
pub use nonce::NonceCounter;
pub use session::{Role, SessionCiphers, SessionState, TrafficPhase};
pub use state::CipherState;
