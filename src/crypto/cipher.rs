//! Per-direction message cipher
//!
//! A [`MessageCipher`] owns everything one direction of a session needs:
//! the AES-128-GCM key schedule, the nonce counter and its mode. Every call
//! to [`MessageCipher::transform`] consumes exactly one counter value.
//!
//! The counter is spent as soon as the nonce is computed, before the GCM
//! operation runs. A decryption that fails authentication still advances
//! the counter, which keeps both endpoints in step with the paired device.

use tracing::{debug, error, trace, warn};

use super::{derive_keys, CipherState, GcmCipher, NonceCounter};
use crate::core::{CipherConfig, CryptoError, CryptoResult};

/// Direction of the GCM operation, fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Seal outgoing messages
    Encrypt,
    /// Open incoming messages
    Decrypt,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Encrypt => f.write_str("encrypt"),
            Mode::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// AES-128-GCM cipher for one session direction.
///
/// Nonce-consuming calls take `&mut self`; wrap in a `Mutex` to share
/// one instance between threads.
#[derive(Debug)]
pub struct MessageCipher {
    gcm: GcmCipher,
    nonces: NonceCounter,
    mode: Mode,
}

impl MessageCipher {
    /// Derive a cipher for one direction, optionally resuming exported state.
    ///
    /// The key is always derived from `shared_secret`, `label` and `context`.
    /// With `resume = None` the nonce sequence starts at counter 0 from the
    /// derived base nonce; otherwise base nonce, counter base and counter are
    /// taken from the state as exported.
    ///
    /// # Errors
    /// `KeyDerivationFailed` for an empty secret, `InvalidTagLength` for a
    /// tag length GCM cannot produce.
    pub fn new(
        shared_secret: &[u8],
        label: &[u8],
        context: &[u8],
        mode: Mode,
        config: &CipherConfig,
        resume: Option<&CipherState>,
    ) -> CryptoResult<Self> {
        let (key, base_nonce) = derive_keys(shared_secret, label, context)?.into_parts();
        let gcm = GcmCipher::new(&key, config.tag_len())?;

        let nonces = match resume {
            Some(state) => {
                NonceCounter::resume(state.base_nonce, state.counter_base, state.counter)
            }
            None => NonceCounter::new(base_nonce),
        };

        debug!(
            %mode,
            label_len = label.len(),
            tag_len = config.tag_len(),
            counter = nonces.counter(),
            resumed = resume.is_some(),
            "message cipher ready"
        );

        Ok(Self { gcm, nonces, mode })
    }

    /// Get the mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Authentication tag length in bytes.
    pub fn tag_len(&self) -> usize {
        self.gcm.tag_len()
    }

    /// The counter the next transform will consume.
    pub fn counter(&self) -> u32 {
        self.nonces.counter()
    }

    /// Number of transforms left before exhaustion.
    pub fn remaining(&self) -> u32 {
        self.nonces.remaining()
    }

    /// Whether the nonce space is used up. The instance is dead once true.
    pub fn is_exhausted(&self) -> bool {
        self.nonces.is_exhausted()
    }

    /// Encrypt or decrypt the first `len` bytes of `message`, by mode.
    ///
    /// Encrypting returns `len + tag_len` bytes; decrypting expects the tag
    /// at the end of the input and returns `len - tag_len` bytes.
    ///
    /// # Errors
    /// - `NonceExhausted` once 65536 transforms have run; nothing is consumed.
    /// - `InvalidInput` if `len` exceeds the buffer; nothing is consumed.
    /// - `InvalidInput` if a ciphertext is shorter than the tag; the nonce is spent.
    /// - `AuthenticationFailed` if the tag does not verify; the nonce is spent.
    pub fn transform(&mut self, message: &[u8], len: usize) -> CryptoResult<Vec<u8>> {
        if self.nonces.is_exhausted() {
            error!(mode = %self.mode, "nonce counter exhausted");
            return Err(CryptoError::NonceExhausted);
        }

        let input = message.get(..len).ok_or_else(|| {
            CryptoError::InvalidInput(format!(
                "length {len} exceeds buffer of {} bytes",
                message.len()
            ))
        })?;

        let counter = self.nonces.counter();
        let nonce = self.nonces.next_nonce()?;
        trace!(mode = %self.mode, counter, len, "transform");

        match self.mode {
            Mode::Encrypt => self.gcm.seal(&nonce, input),
            Mode::Decrypt => self.gcm.open(&nonce, input).inspect_err(|e| {
                if matches!(e, CryptoError::AuthenticationFailed) {
                    warn!(counter, len, "message failed authentication");
                }
            }),
        }
    }

    /// Encrypt a whole plaintext.
    ///
    /// # Errors
    /// `InvalidInput` without consuming a nonce if this is a decrypting cipher.
    pub fn encrypt(&mut self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        self.expect_mode(Mode::Encrypt)?;
        self.transform(plaintext, plaintext.len())
    }

    /// Decrypt a whole `ciphertext || tag`.
    ///
    /// # Errors
    /// `InvalidInput` without consuming a nonce if this is an encrypting cipher.
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        self.expect_mode(Mode::Decrypt)?;
        self.transform(ciphertext, ciphertext.len())
    }

    /// Snapshot the nonce sequence for later resumption.
    ///
    /// # Errors
    /// Returns `NonceExhausted` for an exhausted cipher; it must not be resumed.
    pub fn export_state(&self) -> CryptoResult<CipherState> {
        let counter =
            u16::try_from(self.nonces.counter()).map_err(|_| CryptoError::NonceExhausted)?;
        debug!(mode = %self.mode, counter, "cipher state exported");

        Ok(CipherState {
            base_nonce: *self.nonces.base_nonce(),
            counter_base: *self.nonces.counter_base(),
            counter,
        })
    }

    fn expect_mode(&self, mode: Mode) -> CryptoResult<()> {
        if self.mode != mode {
            return Err(CryptoError::InvalidInput(format!(
                "cannot {mode} with a {} cipher",
                self.mode
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rand::{Rng, RngCore};

    use super::*;
    use crate::core::NONCE_SPACE;

    fn secret() -> [u8; 32] {
        let mut s = [0u8; 32];
        for (i, b) in s.iter_mut().enumerate() {
            *b = i as u8;
        }
        s
    }

    fn cipher(mode: Mode) -> MessageCipher {
        MessageCipher::new(
            &secret(),
            b"dir-a",
            b"session-42",
            mode,
            &CipherConfig::default(),
            None,
        )
        .unwrap()
    }

    fn resumed(mode: Mode, state: &CipherState) -> MessageCipher {
        MessageCipher::new(
            &secret(),
            b"dir-a",
            b"session-42",
            mode,
            &CipherConfig::default(),
            Some(state),
        )
        .unwrap()
    }

    #[test]
    fn test_example_scenario() {
        let mut encryptor = cipher(Mode::Encrypt);
        let mut decryptor = cipher(Mode::Decrypt);

        let ciphertext = encryptor.transform(b"hello", 5).unwrap();
        assert_eq!(
            hex::encode(&ciphertext),
            "b8dee5e1ec0bd0a0433723743d4021a45bbd744f7f"
        );

        let plaintext = decryptor.transform(&ciphertext, ciphertext.len()).unwrap();
        assert_eq!(plaintext, b"hello");
        assert_eq!(encryptor.counter(), 1);
        assert_eq!(decryptor.counter(), 1);
    }

    #[test]
    fn test_second_message_uses_next_nonce() {
        let mut encryptor = cipher(Mode::Encrypt);
        encryptor.encrypt(b"hello").unwrap();

        let second = encryptor.encrypt(b"hello").unwrap();
        assert_eq!(
            hex::encode(&second),
            "bc965623fc7ab20dd6cef7efb12f4a196de11893b3"
        );
    }

    #[test]
    fn test_transform_uses_prefix_of_buffer() {
        let mut encryptor = cipher(Mode::Encrypt);
        let mut decryptor = cipher(Mode::Decrypt);

        // Caller-owned buffer with room reserved for the tag
        let mut buffer = b"hello".to_vec();
        buffer.resize(5 + 16, 0);

        let ciphertext = encryptor.transform(&buffer, 5).unwrap();
        assert_eq!(ciphertext.len(), 5 + 16);
        assert_eq!(decryptor.decrypt(&ciphertext).unwrap(), b"hello");
    }

    #[test]
    fn test_roundtrip_many_messages() {
        let mut rng = rand::thread_rng();
        let mut encryptor = cipher(Mode::Encrypt);
        let mut decryptor = cipher(Mode::Decrypt);

        for step in 0..200u32 {
            let mut message = vec![0u8; rng.gen_range(0..512)];
            rng.fill_bytes(&mut message);

            let ciphertext = encryptor.encrypt(&message).unwrap();
            assert_eq!(ciphertext.len(), message.len() + 16);
            assert_eq!(decryptor.decrypt(&ciphertext).unwrap(), message);
            assert_eq!(encryptor.counter(), step + 1);
            assert_eq!(decryptor.counter(), step + 1);
        }
    }

    #[test]
    fn test_every_bit_flip_detected() {
        let mut encryptor = cipher(Mode::Encrypt);
        let state = cipher(Mode::Decrypt).export_state().unwrap();
        let ciphertext = encryptor.encrypt(b"hello").unwrap();

        for byte in 0..ciphertext.len() {
            for bit in 0..8 {
                let mut tampered = ciphertext.clone();
                tampered[byte] ^= 1 << bit;

                let mut decryptor = resumed(Mode::Decrypt, &state);
                assert_eq!(
                    decryptor.decrypt(&tampered),
                    Err(CryptoError::AuthenticationFailed)
                );
            }
        }
    }

    #[test]
    fn test_failed_decrypt_spends_nonce() {
        let mut encryptor = cipher(Mode::Encrypt);
        let mut decryptor = cipher(Mode::Decrypt);

        let first = encryptor.encrypt(b"first").unwrap();
        let second = encryptor.encrypt(b"second").unwrap();

        let mut tampered = first.clone();
        tampered[0] ^= 0x80;
        assert!(decryptor.decrypt(&tampered).is_err());
        assert_eq!(decryptor.counter(), 1);

        // The session carries on with the next message
        assert_eq!(decryptor.decrypt(&second).unwrap(), b"second");

        // The genuine first message can no longer be opened
        assert_eq!(
            decryptor.decrypt(&first),
            Err(CryptoError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_short_ciphertext_spends_nonce() {
        let mut decryptor = cipher(Mode::Decrypt);

        let result = decryptor.decrypt(&[0u8; 8]);
        assert!(matches!(result, Err(CryptoError::InvalidInput(_))));
        assert_eq!(decryptor.counter(), 1);
    }

    #[test]
    fn test_length_past_buffer_rejected() {
        let mut encryptor = cipher(Mode::Encrypt);

        let result = encryptor.transform(b"abc", 4);
        assert!(matches!(result, Err(CryptoError::InvalidInput(_))));
        assert_eq!(encryptor.counter(), 0);
    }

    #[test]
    fn test_wrong_mode_rejected() {
        let mut encryptor = cipher(Mode::Encrypt);
        let mut decryptor = cipher(Mode::Decrypt);

        assert!(matches!(
            encryptor.decrypt(&[0u8; 32]),
            Err(CryptoError::InvalidInput(_))
        ));
        assert!(matches!(
            decryptor.encrypt(b"hello"),
            Err(CryptoError::InvalidInput(_))
        ));
        assert_eq!(encryptor.counter(), 0);
        assert_eq!(decryptor.counter(), 0);
    }

    #[test]
    fn test_label_mismatch_fails() {
        let mut encryptor = cipher(Mode::Encrypt);
        let mut decryptor = MessageCipher::new(
            &secret(),
            b"dir-b",
            b"session-42",
            Mode::Decrypt,
            &CipherConfig::default(),
            None,
        )
        .unwrap();

        let ciphertext = encryptor.encrypt(b"hello").unwrap();
        assert_eq!(
            decryptor.decrypt(&ciphertext),
            Err(CryptoError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_custom_tag_len() {
        let config = CipherConfig::new(12).unwrap();
        let mut encryptor =
            MessageCipher::new(&secret(), b"dir-a", b"", Mode::Encrypt, &config, None).unwrap();
        let mut decryptor =
            MessageCipher::new(&secret(), b"dir-a", b"", Mode::Decrypt, &config, None).unwrap();

        assert_eq!(encryptor.tag_len(), 12);
        let ciphertext = encryptor.encrypt(b"hello").unwrap();
        assert_eq!(ciphertext.len(), 5 + 12);
        assert_eq!(decryptor.decrypt(&ciphertext).unwrap(), b"hello");
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = MessageCipher::new(
            &[],
            b"dir-a",
            b"session-42",
            Mode::Encrypt,
            &CipherConfig::default(),
            None,
        );
        assert!(matches!(result, Err(CryptoError::KeyDerivationFailed)));
    }

    #[test]
    fn test_exhaustion_after_full_nonce_space() {
        let mut encryptor = cipher(Mode::Encrypt);

        for _ in 0..NONCE_SPACE {
            encryptor.encrypt(b"").unwrap();
        }
        assert!(encryptor.is_exhausted());
        assert_eq!(encryptor.remaining(), 0);

        assert_eq!(encryptor.encrypt(b"x"), Err(CryptoError::NonceExhausted));
        assert_eq!(encryptor.transform(b"x", 1), Err(CryptoError::NonceExhausted));
        assert_eq!(encryptor.export_state(), Err(CryptoError::NonceExhausted));
        assert!(CryptoError::NonceExhausted.is_terminal());
    }

    #[test]
    fn test_resumed_at_last_counter() {
        let mut state = cipher(Mode::Encrypt).export_state().unwrap();
        state.counter = 0xFFFF;
        let mut encryptor = resumed(Mode::Encrypt, &state);

        assert_eq!(encryptor.remaining(), 1);
        assert!(encryptor.encrypt(b"last").is_ok());
        assert_eq!(encryptor.encrypt(b"one more"), Err(CryptoError::NonceExhausted));
    }

    #[test]
    fn test_resume_matches_uninterrupted() {
        let mut original = cipher(Mode::Encrypt);
        for _ in 0..10 {
            original.encrypt(b"warmup").unwrap();
        }

        let state = original.export_state().unwrap();
        assert_eq!(state.counter, 10);

        let restored = CipherState::from_bytes(&state.to_bytes()).unwrap();
        let mut restarted = resumed(Mode::Encrypt, &restored);
        assert_eq!(restarted.nonces, original.nonces);

        for i in 0..20u8 {
            let message = [i; 7];
            assert_eq!(
                restarted.encrypt(&message).unwrap(),
                original.encrypt(&message).unwrap()
            );
        }
        assert_eq!(restarted.counter(), 30);
    }

    #[test]
    fn test_resumed_decryptor_follows_sender() {
        let mut encryptor = cipher(Mode::Encrypt);
        let mut decryptor = cipher(Mode::Decrypt);

        for _ in 0..3 {
            let ciphertext = encryptor.encrypt(b"before").unwrap();
            decryptor.decrypt(&ciphertext).unwrap();
        }

        let state = decryptor.export_state().unwrap();
        drop(decryptor);

        let mut decryptor = resumed(Mode::Decrypt, &state);
        let ciphertext = encryptor.encrypt(b"after restart").unwrap();
        assert_eq!(decryptor.decrypt(&ciphertext).unwrap(), b"after restart");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shared_encryptor_serializes_nonces() {
        let encryptor = Arc::new(Mutex::new(cipher(Mode::Encrypt)));
        let mut handles = Vec::new();

        for task in 0..4u8 {
            let encryptor = Arc::clone(&encryptor);
            handles.push(tokio::spawn(async move {
                let mut sealed = Vec::new();
                for i in 0..50u8 {
                    let message = vec![task, i];
                    let mut guard = encryptor.lock().unwrap();
                    let counter = guard.counter();
                    sealed.push((counter, message.clone(), guard.encrypt(&message).unwrap()));
                }
                sealed
            }));
        }

        let mut sealed = Vec::new();
        for handle in handles {
            sealed.extend(handle.await.unwrap());
        }
        sealed.sort_by_key(|(counter, _, _)| *counter);

        // Every counter used exactly once, so an in-order receiver opens them all
        let mut decryptor = cipher(Mode::Decrypt);
        for (expected, (counter, message, ciphertext)) in sealed.iter().enumerate() {
            assert_eq!(*counter, expected as u32);
            assert_eq!(&decryptor.decrypt(ciphertext).unwrap(), message);
        }
        assert_eq!(decryptor.counter(), 200);
    }
}
