// Session configuration for delta synchronization.
//
// A `SyncConfig` is created once per synchronization session and validated
// before any file I/O. The same configuration must be used on both sides of
// a session: signature generation and matching.

use thiserror::Error;

use crate::hash::strong::StrongAlgorithm;

/// Default block length in bytes (matches the historical rsync demo setup).
pub const DEFAULT_BLOCK_LENGTH: usize = 1024;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Configuration errors, raised at session start before any file I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `block_length` must be at least one byte.
    #[error("block length must be at least 1 byte")]
    ZeroBlockLength,
    /// Requested strong checksum truncation is out of range for the algorithm.
    #[error("strong checksum length {requested} outside 1..={max} for {algorithm}")]
    BadStrongLength {
        requested: usize,
        max: usize,
        algorithm: StrongAlgorithm,
    },
    /// The base file has more blocks than a 32-bit block index can address.
    #[error("input of {len} bytes exceeds the addressable block count at block length {block_length}")]
    TooManyBlocks { len: usize, block_length: usize },
}

// ---------------------------------------------------------------------------
// SyncConfig
// ---------------------------------------------------------------------------

/// Parameters shared by signature generation and matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Bytes per block; every block but possibly the last has this length.
    pub block_length: usize,
    /// Strong checksum algorithm used to confirm weak-sum candidates.
    pub strong: StrongAlgorithm,
    /// Strong checksum length in bytes; digests are truncated to this size.
    pub strong_length: usize,
}

impl SyncConfig {
    /// Create a configuration using the algorithm's full digest length.
    pub fn new(block_length: usize, strong: StrongAlgorithm) -> Self {
        Self {
            block_length,
            strong,
            strong_length: strong.digest_length(),
        }
    }

    /// Truncate strong checksums to `strong_length` bytes.
    pub fn with_strong_length(mut self, strong_length: usize) -> Self {
        self.strong_length = strong_length;
        self
    }

    /// Validate the configuration. Fails fast, before any file I/O.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_length == 0 {
            return Err(ConfigError::ZeroBlockLength);
        }
        let max = self.strong.digest_length();
        if self.strong_length == 0 || self.strong_length > max {
            return Err(ConfigError::BadStrongLength {
                requested: self.strong_length,
                max,
                algorithm: self.strong,
            });
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_LENGTH, StrongAlgorithm::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = SyncConfig::default();
        assert_eq!(cfg.block_length, DEFAULT_BLOCK_LENGTH);
        assert_eq!(cfg.strong_length, cfg.strong.digest_length());
        cfg.validate().unwrap();
    }

    #[test]
    fn zero_block_length_rejected() {
        let cfg = SyncConfig::new(0, StrongAlgorithm::Md4);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroBlockLength));
    }

    #[test]
    fn strong_length_bounds() {
        let cfg = SyncConfig::new(1024, StrongAlgorithm::Md5).with_strong_length(0);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::BadStrongLength { requested: 0, .. })
        ));

        let cfg = SyncConfig::new(1024, StrongAlgorithm::Md5).with_strong_length(17);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::BadStrongLength {
                requested: 17,
                max: 16,
                ..
            })
        ));

        let cfg = SyncConfig::new(1024, StrongAlgorithm::Md5).with_strong_length(8);
        cfg.validate().unwrap();
    }

    #[test]
    fn sha256_full_length() {
        let cfg = SyncConfig::new(512, StrongAlgorithm::Sha256);
        assert_eq!(cfg.strong_length, 32);
        cfg.validate().unwrap();
    }
}
