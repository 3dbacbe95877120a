//! Key and base-nonce derivation
//!
//! Both endpoints derive the same per-direction material independently:
//!
//! ```text
//! digest     = HMAC-SHA256(key = shared_secret, label || context)
//! key        = digest[0..16]
//! base_nonce = digest[16..28]
//! ```

use hmac::{digest::{generic_array::GenericArray, FixedOutput}, Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::core::{CryptoError, CryptoResult, DIGEST_SIZE, KEY_SIZE, NONCE_SIZE};

/// An AES-128 key for one session direction.
///
/// Zeroized on drop for security.
#[derive(Clone)]
pub struct CipherKey {
    key: [u8; KEY_SIZE],
}

impl CipherKey {
    /// Create a key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }

    /// Get the raw key bytes.
    ///
    /// # Security
    /// Handle with care - this exposes sensitive key material.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl Drop for CipherKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl std::fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CipherKey([REDACTED])")
    }
}

/// Output of [`derive_keys`].
#[derive(Debug, Clone)]
pub struct DerivedKeys {
    key: CipherKey,
    base_nonce: [u8; NONCE_SIZE],
}

impl DerivedKeys {
    /// The AES-128 key.
    pub fn key(&self) -> &CipherKey {
        &self.key
    }

    /// The 12-byte base nonce.
    pub fn base_nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.base_nonce
    }

    /// Split into key and base nonce.
    pub fn into_parts(self) -> (CipherKey, [u8; NONCE_SIZE]) {
        (self.key, self.base_nonce)
    }
}

/// Derive the direction key and base nonce.
///
/// Deterministic: identical inputs always give identical output.
///
/// # Arguments
/// * `shared_secret` - Secret agreed during pairing; only borrowed here
/// * `label` - Protocol label naming the direction and phase
/// * `context` - Additional protocol data, e.g. the transcript hash
///
/// # Errors
/// Returns `KeyDerivationFailed` if the shared secret is empty.
pub fn derive_keys(
    shared_secret: &[u8],
    label: &[u8],
    context: &[u8],
) -> CryptoResult<DerivedKeys> {
    if shared_secret.is_empty() {
        return Err(CryptoError::KeyDerivationFailed);
    }

    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(shared_secret)
        .map_err(|_| CryptoError::KeyDerivationFailed)?;
    mac.update(label);
    mac.update(context);

    // Finalize straight into the zeroizing buffer so no copy of the digest outlives it
    let mut digest = Zeroizing::new([0u8; DIGEST_SIZE]);
    mac.finalize_into(GenericArray::from_mut_slice(&mut digest[..]));

    let mut key = [0u8; KEY_SIZE];
    let mut base_nonce = [0u8; NONCE_SIZE];
    key.copy_from_slice(&digest[..KEY_SIZE]);
    base_nonce.copy_from_slice(&digest[KEY_SIZE..KEY_SIZE + NONCE_SIZE]);

    Ok(DerivedKeys {
        key: CipherKey::from_bytes(key),
        base_nonce,
    })
}
