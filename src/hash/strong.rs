// Strong checksum algorithms.
//
// Collision-resistant digests confirm weak-sum candidates during matching.
// The algorithm is pluggable per session via `SyncConfig`; all of them go
// through the RustCrypto `digest` trait, so adding one is a new enum
// variant plus a dispatch arm. Digests may be truncated to the session's
// `strong_length`, consistently on both the generator and matcher side.

use std::fmt;

use digest::Digest;

/// Strong checksum algorithm selector.
///
/// MD4 is the historical rsync default and only a candidate-confirmation
/// hash here, not an integrity guarantee; pick SHA-256 for adversarial
/// inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StrongAlgorithm {
    /// MD4, 16-byte digest (historical rsync default).
    #[default]
    Md4,
    /// MD5, 16-byte digest.
    Md5,
    /// SHA-256, 32-byte digest.
    Sha256,
}

impl StrongAlgorithm {
    /// Full digest length in bytes before any truncation.
    pub fn digest_length(self) -> usize {
        match self {
            Self::Md4 | Self::Md5 => 16,
            Self::Sha256 => 32,
        }
    }

    /// Stable one-byte identifier used in the signature framing.
    pub fn id(self) -> u8 {
        match self {
            Self::Md4 => 0,
            Self::Md5 => 1,
            Self::Sha256 => 2,
        }
    }

    /// Inverse of [`id`](Self::id).
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Md4),
            1 => Some(Self::Md5),
            2 => Some(Self::Sha256),
            _ => None,
        }
    }

    /// Digest `data`, truncated to `strong_length` bytes.
    ///
    /// `strong_length` must have been validated against
    /// [`digest_length`](Self::digest_length) by `SyncConfig::validate`.
    pub fn compute(self, data: &[u8], strong_length: usize) -> Vec<u8> {
        let mut full = match self {
            Self::Md4 => md4::Md4::digest(data).to_vec(),
            Self::Md5 => md5::Md5::digest(data).to_vec(),
            Self::Sha256 => sha2::Sha256::digest(data).to_vec(),
        };
        full.truncate(strong_length);
        full
    }
}

impl fmt::Display for StrongAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Md4 => "md4",
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_lengths() {
        assert_eq!(StrongAlgorithm::Md4.compute(b"abc", 16).len(), 16);
        assert_eq!(StrongAlgorithm::Md5.compute(b"abc", 16).len(), 16);
        assert_eq!(StrongAlgorithm::Sha256.compute(b"abc", 32).len(), 32);
    }

    #[test]
    fn truncation_is_a_prefix() {
        for alg in [
            StrongAlgorithm::Md4,
            StrongAlgorithm::Md5,
            StrongAlgorithm::Sha256,
        ] {
            let full = alg.compute(b"truncate me", alg.digest_length());
            let short = alg.compute(b"truncate me", 8);
            assert_eq!(short, full[..8]);
        }
    }

    #[test]
    fn algorithms_disagree() {
        let data = b"same input";
        assert_ne!(
            StrongAlgorithm::Md4.compute(data, 16),
            StrongAlgorithm::Md5.compute(data, 16)
        );
    }

    #[test]
    fn md5_known_vector() {
        // RFC 1321 test vector: MD5("abc").
        let d = StrongAlgorithm::Md5.compute(b"abc", 16);
        assert_eq!(
            d,
            [
                0x90, 0x01, 0x50, 0x98, 0x3c, 0xd2, 0x4f, 0xb0, 0xd6, 0x96, 0x3f, 0x7d, 0x28,
                0xe1, 0x7f, 0x72
            ]
        );
    }

    #[test]
    fn id_roundtrip() {
        for alg in [
            StrongAlgorithm::Md4,
            StrongAlgorithm::Md5,
            StrongAlgorithm::Sha256,
        ] {
            assert_eq!(StrongAlgorithm::from_id(alg.id()), Some(alg));
        }
        assert_eq!(StrongAlgorithm::from_id(0xFF), None);
    }
}
