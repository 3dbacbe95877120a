//! Paired session: one cipher per direction
//!
//! A secure session with a paired device runs two independent message
//! flows. Each flow gets its own key and nonce sequence, derived from the
//! same shared secret under a direction label and the transcript hash:
//!
//! | Phase       | Client → Device      | Device → Client      |
//! |-------------|----------------------|----------------------|
//! | Handshake   | `ptlsc hs traffic`   | `ptlss hs traffic`   |
//! | Application | `ptlsc ap traffic`   | `ptlss ap traffic`   |

use tracing::debug;

use super::{CipherState, MessageCipher, Mode};
use crate::core::{
    CipherConfig, CryptoError, CryptoResult, CIPHER_STATE_SIZE, CLIENT_AP_TRAFFIC,
    CLIENT_HS_TRAFFIC, SERVER_AP_TRAFFIC, SERVER_HS_TRAFFIC, SESSION_STATE_SIZE,
};

/// Our side of the pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Mobile client
    Client,
    /// Paired device
    Device,
}

impl Role {
    /// Get the opposite role.
    pub fn peer(self) -> Self {
        match self {
            Role::Client => Role::Device,
            Role::Device => Role::Client,
        }
    }
}

/// Which traffic keys are in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrafficPhase {
    /// Keys protecting the rest of the handshake
    Handshake,
    /// Keys protecting application data
    Application,
}

impl TrafficPhase {
    /// Labels for (client → device, device → client).
    pub fn labels(self) -> (&'static [u8], &'static [u8]) {
        match self {
            TrafficPhase::Handshake => (CLIENT_HS_TRAFFIC, SERVER_HS_TRAFFIC),
            TrafficPhase::Application => (CLIENT_AP_TRAFFIC, SERVER_AP_TRAFFIC),
        }
    }
}

/// Exported state of both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionState {
    /// Outgoing direction
    pub send: CipherState,
    /// Incoming direction
    pub recv: CipherState,
}

impl SessionState {
    /// Serialize as send state followed by receive state (32 bytes).
    pub fn to_bytes(&self) -> [u8; SESSION_STATE_SIZE] {
        let mut out = [0u8; SESSION_STATE_SIZE];
        out[..CIPHER_STATE_SIZE].copy_from_slice(&self.send.to_bytes());
        out[CIPHER_STATE_SIZE..].copy_from_slice(&self.recv.to_bytes());
        out
    }

    /// Parse the 32-byte layout.
    ///
    /// # Errors
    /// Returns `InvalidInput` unless `bytes` is exactly 32 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != SESSION_STATE_SIZE {
            return Err(CryptoError::InvalidInput(format!(
                "session state must be {SESSION_STATE_SIZE} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self {
            send: CipherState::from_bytes(&bytes[..CIPHER_STATE_SIZE])?,
            recv: CipherState::from_bytes(&bytes[CIPHER_STATE_SIZE..])?,
        })
    }
}

/// Encrypting and decrypting ciphers for one side of a session.
#[derive(Debug)]
pub struct SessionCiphers {
    role: Role,
    phase: TrafficPhase,
    send: MessageCipher,
    recv: MessageCipher,
}

impl SessionCiphers {
    /// Derive both directions for a fresh phase.
    ///
    /// # Arguments
    /// * `shared_secret` - Secret agreed during pairing
    /// * `phase` - Handshake or application traffic
    /// * `role` - Our side; selects which label encrypts
    /// * `transcript_hash` - Context data binding keys to this handshake
    /// * `config` - Tag length and other per-cipher settings
    pub fn new(
        shared_secret: &[u8],
        phase: TrafficPhase,
        role: Role,
        transcript_hash: &[u8],
        config: &CipherConfig,
    ) -> CryptoResult<Self> {
        Self::build(shared_secret, phase, role, transcript_hash, config, None)
    }

    /// Re-derive both directions and continue from exported state.
    pub fn resume(
        shared_secret: &[u8],
        phase: TrafficPhase,
        role: Role,
        transcript_hash: &[u8],
        config: &CipherConfig,
        state: &SessionState,
    ) -> CryptoResult<Self> {
        Self::build(shared_secret, phase, role, transcript_hash, config, Some(state))
    }

    fn build(
        shared_secret: &[u8],
        phase: TrafficPhase,
        role: Role,
        transcript_hash: &[u8],
        config: &CipherConfig,
        state: Option<&SessionState>,
    ) -> CryptoResult<Self> {
        let (client_label, device_label) = phase.labels();
        let (send_label, recv_label) = match role {
            Role::Client => (client_label, device_label),
            Role::Device => (device_label, client_label),
        };

        let send = MessageCipher::new(
            shared_secret,
            send_label,
            transcript_hash,
            Mode::Encrypt,
            config,
            state.map(|s| &s.send),
        )?;
        let recv = MessageCipher::new(
            shared_secret,
            recv_label,
            transcript_hash,
            Mode::Decrypt,
            config,
            state.map(|s| &s.recv),
        )?;

        debug!(?role, ?phase, resumed = state.is_some(), "session ciphers ready");

        Ok(Self {
            role,
            phase,
            send,
            recv,
        })
    }

    /// Get our role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Get the traffic phase.
    pub fn phase(&self) -> TrafficPhase {
        self.phase
    }

    /// The outgoing cipher.
    pub fn sender(&self) -> &MessageCipher {
        &self.send
    }

    /// The incoming cipher.
    pub fn receiver(&self) -> &MessageCipher {
        &self.recv
    }

    /// Encrypt an outgoing message.
    pub fn seal(&mut self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        self.send.encrypt(plaintext)
    }

    /// Decrypt an incoming message.
    ///
    /// An `AuthenticationFailed` result spends the receive nonce; drop the
    /// message and keep the session, or tear it down if failures persist.
    pub fn open(&mut self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        self.recv.decrypt(ciphertext)
    }

    /// Snapshot both directions.
    ///
    /// # Errors
    /// Returns `NonceExhausted` if either direction is exhausted.
    pub fn export_state(&self) -> CryptoResult<SessionState> {
        Ok(SessionState {
            send: self.send.export_state()?,
            recv: self.recv.export_state()?,
        })
    }
}
