//! AES-128-GCM encryption
//!
//! Output layout is `ciphertext || tag`, where the tag length is fixed per
//! instance by [`CipherConfig`](crate::core::CipherConfig). GCM tags shorter
//! than 16 bytes are the leading bytes of the full tag.

use aes_gcm::{
    aead::{
        consts::{U12, U13, U14, U15, U16},
        Aead, KeyInit,
    },
    aes::Aes128,
    AesGcm, Nonce,
};

use super::CipherKey;
use crate::core::{CryptoError, CryptoResult, NONCE_SIZE};

type Aes128GcmTag<T> = AesGcm<Aes128, U12, T>;

/// AES-128-GCM keyed for one direction, with the tag length chosen at runtime.
///
/// Holds the expanded key; the `aes` round keys are zeroized on drop.
pub(crate) enum GcmCipher {
    /// 12-byte tag
    Tag12(Aes128GcmTag<U12>),
    /// 13-byte tag
    Tag13(Aes128GcmTag<U13>),
    /// 14-byte tag
    Tag14(Aes128GcmTag<U14>),
    /// 15-byte tag
    Tag15(Aes128GcmTag<U15>),
    /// 16-byte tag
    Tag16(Aes128GcmTag<U16>),
}

macro_rules! with_gcm {
    ($self:expr, $gcm:ident => $body:expr) => {
        match $self {
            GcmCipher::Tag12($gcm) => $body,
            GcmCipher::Tag13($gcm) => $body,
            GcmCipher::Tag14($gcm) => $body,
            GcmCipher::Tag15($gcm) => $body,
            GcmCipher::Tag16($gcm) => $body,
        }
    };
}

impl GcmCipher {
    /// Key a cipher with the given tag length.
    ///
    /// # Errors
    /// Returns `InvalidTagLength` unless `12 <= tag_len <= 16`.
    pub(crate) fn new(key: &CipherKey, tag_len: usize) -> CryptoResult<Self> {
        let key = key.as_bytes();
        let cipher = match tag_len {
            12 => GcmCipher::Tag12(keyed(key)?),
            13 => GcmCipher::Tag13(keyed(key)?),
            14 => GcmCipher::Tag14(keyed(key)?),
            15 => GcmCipher::Tag15(keyed(key)?),
            16 => GcmCipher::Tag16(keyed(key)?),
            other => return Err(CryptoError::InvalidTagLength(other)),
        };
        Ok(cipher)
    }

    /// Authentication tag length in bytes.
    pub(crate) fn tag_len(&self) -> usize {
        match self {
            GcmCipher::Tag12(_) => 12,
            GcmCipher::Tag13(_) => 13,
            GcmCipher::Tag14(_) => 14,
            GcmCipher::Tag15(_) => 15,
            GcmCipher::Tag16(_) => 16,
        }
    }

    /// Encrypt plaintext, appending the tag.
    pub(crate) fn seal(&self, nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let nonce = Nonce::from_slice(nonce);
        with_gcm!(self, gcm => gcm.encrypt(nonce, plaintext))
            .map_err(|_| CryptoError::InvalidInput("plaintext too long for AES-GCM".into()))
    }

    /// Verify the tag and decrypt.
    ///
    /// # Errors
    /// `InvalidInput` if the input is shorter than the tag,
    /// `AuthenticationFailed` if the tag does not verify.
    pub(crate) fn open(&self, nonce: &[u8; NONCE_SIZE], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        if ciphertext.len() < self.tag_len() {
            return Err(CryptoError::InvalidInput(format!(
                "ciphertext of {} bytes is shorter than the {}-byte tag",
                ciphertext.len(),
                self.tag_len()
            )));
        }

        let nonce = Nonce::from_slice(nonce);
        with_gcm!(self, gcm => gcm.decrypt(nonce, ciphertext))
            .map_err(|_| CryptoError::AuthenticationFailed)
    }
}

impl std::fmt::Debug for GcmCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcmCipher")
            .field("tag_len", &self.tag_len())
            .finish_non_exhaustive()
    }
}

fn keyed<C: KeyInit>(key: &[u8]) -> CryptoResult<C> {
    C::new_from_slice(key).map_err(|_| CryptoError::KeyDerivationFailed)
}
