//! Cipher configuration.

use super::{CryptoError, CryptoResult, DEFAULT_TAG_SIZE, MAX_TAG_SIZE, MIN_TAG_SIZE};

/// Per-instance cipher configuration supplied by the surrounding protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherConfig {
    tag_len: usize,
}

impl CipherConfig {
    /// Create a configuration with the given authentication tag length.
    ///
    /// # Errors
    /// Returns `InvalidTagLength` unless `12 <= tag_len <= 16`.
    pub fn new(tag_len: usize) -> CryptoResult<Self> {
        if !(MIN_TAG_SIZE..=MAX_TAG_SIZE).contains(&tag_len) {
            return Err(CryptoError::InvalidTagLength(tag_len));
        }
        Ok(Self { tag_len })
    }

    /// Start building a configuration from the defaults.
    pub fn builder() -> CipherConfigBuilder {
        CipherConfigBuilder::new()
    }

    /// Authentication tag length in bytes.
    pub fn tag_len(&self) -> usize {
        self.tag_len
    }
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            tag_len: DEFAULT_TAG_SIZE,
        }
    }
}

/// Builder for [`CipherConfig`].
#[derive(Debug)]
pub struct CipherConfigBuilder {
    tag_len: usize,
}

impl CipherConfigBuilder {
    /// Create a new builder with the default tag length.
    pub fn new() -> Self {
        Self {
            tag_len: DEFAULT_TAG_SIZE,
        }
    }

    /// Set the authentication tag length.
    pub fn tag_len(mut self, tag_len: usize) -> Self {
        self.tag_len = tag_len;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> CryptoResult<CipherConfig> {
        CipherConfig::new(self.tag_len)
    }
}

impl Default for CipherConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
