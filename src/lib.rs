//! # PTLS Cipher
//!
//! Per-direction authenticated encryption for a paired-device secure
//! session, e.g. a mobile client talking to a lock over Bluetooth.
//!
//! Given a shared secret agreed during pairing, each direction derives its
//! own AES-128 key and base nonce, then protects a bounded sequence of
//! messages with AES-128-GCM:
//!
//! - **Derivation**: HMAC-SHA256 over `label || context`, keyed by the secret
//! - **Nonces**: counter XORed into the base nonce, unique for 65536 messages
//! - **Exhaustion**: detected before any nonce could repeat
//! - **Resumption**: a 16-byte state restores the nonce sequence after restart
//!
//! The handshake that produces the secret and the transport that frames
//! messages are out of scope.
//!
//! ## Feature Flags
//!
//! - `crypto` (default): Security layer (HMAC-SHA256, AES-128-GCM)
//!
//! ## Modules
//!
//! - [`core`]: Constants, configuration and error types (always included)
//! - [`crypto`]: Ciphers, nonces and state codec (requires `crypto` feature)
//!
//! ## Example Usage
//!
//! ```rust
//! use ptls_cipher::prelude::*;
//!
//! let secret = [0x42u8; 32];
//! let config = CipherConfig::default();
//!
//! let mut sender =
//!     MessageCipher::new(&secret, b"dir-a", b"session-42", Mode::Encrypt, &config, None)?;
//! let mut receiver =
//!     MessageCipher::new(&secret, b"dir-a", b"session-42", Mode::Decrypt, &config, None)?;
//!
//! let ciphertext = sender.encrypt(b"hello")?;
//! assert_eq!(receiver.decrypt(&ciphertext)?, b"hello");
//!
//! // Persist the receive direction and pick it up again later
//! let saved = receiver.export_state()?.to_bytes();
//! let state = CipherState::from_bytes(&saved)?;
//! let mut receiver =
//!     MessageCipher::new(&secret, b"dir-a", b"session-42", Mode::Decrypt, &config, Some(&state))?;
//!
//! let ciphertext = sender.encrypt(b"again")?;
//! assert_eq!(receiver.decrypt(&ciphertext)?, b"again");
//! # Ok::<(), CryptoError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Crypto layer (feature-gated)
#[cfg(feature = "crypto")]
#[cfg_attr(docsrs, doc(cfg(feature = "crypto")))]
pub mod crypto;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;

    #[cfg(feature = "crypto")]
    pub use crate::crypto::*;
}

// Re-export commonly used items at crate root
pub use crate::core::{CipherConfig, CryptoError, CryptoResult};

#[cfg(feature = "crypto")]
pub use crate::crypto::{CipherState, MessageCipher, Mode, SessionCiphers};
