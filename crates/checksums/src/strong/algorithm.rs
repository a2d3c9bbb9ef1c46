use std::fmt;
use std::str::FromStr;

use super::{Md4, Md5, Sha1, StrongDigest, Xxh64};

/// Largest digest produced by any [`StrongAlgorithm`].
const MAX_DIGEST_LEN: usize = 20;

/// Strong checksum algorithm selected at runtime.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum StrongAlgorithm {
    /// MD4, 16 bytes.
    #[default]
    Md4,
    /// MD5, 16 bytes.
    Md5,
    /// SHA-1, 20 bytes.
    Sha1,
    /// Seeded XXH64, 8 bytes.
    Xxh64 {
        /// Seed mixed into every digest.
        seed: u64,
    },
}

impl StrongAlgorithm {
    /// Returns the full digest length in bytes.
    #[must_use]
    pub const fn digest_len(self) -> usize {
        match self {
            Self::Md4 => Md4::DIGEST_LEN,
            Self::Md5 => Md5::DIGEST_LEN,
            Self::Sha1 => Sha1::DIGEST_LEN,
            Self::Xxh64 { .. } => Xxh64::DIGEST_LEN,
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Md4 => "md4",
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Xxh64 { .. } => "xxh64",
        }
    }

    /// Computes the digest of `data`.
    #[must_use]
    pub fn compute(self, data: &[u8]) -> StrongSum {
        match self {
            Self::Md4 => StrongSum::from_slice(&Md4::digest(data)),
            Self::Md5 => StrongSum::from_slice(&Md5::digest(data)),
            Self::Sha1 => StrongSum::from_slice(&Sha1::digest(data)),
            Self::Xxh64 { seed } => StrongSum::from_slice(&Xxh64::digest(seed, data)),
        }
    }
}

impl fmt::Display for StrongAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown algorithm name.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown strong checksum algorithm '{name}' (expected md4, md5, sha1 or xxh64)")]
pub struct StrongAlgorithmParseError {
    name: String,
}

impl StrongAlgorithmParseError {
    /// Returns the rejected name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for StrongAlgorithm {
    type Err = StrongAlgorithmParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md4" => Ok(Self::Md4),
            "md5" => Ok(Self::Md5),
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "xxh64" | "xxhash" => Ok(Self::Xxh64 { seed: 0 }),
            _ => Err(StrongAlgorithmParseError { name: s.to_owned() }),
        }
    }
}

/// Inline strong digest, at most 20 bytes.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct StrongSum {
    bytes: [u8; MAX_DIGEST_LEN],
    len: u8,
}

impl StrongSum {
    fn from_slice(digest: &[u8]) -> Self {
        let mut bytes = [0u8; MAX_DIGEST_LEN];
        bytes[..digest.len()].copy_from_slice(digest);
        Self {
            bytes,
            len: digest.len() as u8,
        }
    }

    /// Returns the digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// Returns the digest length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Reports whether the digest is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a copy keeping only the first `len` bytes. Longer lengths are clamped.
    #[must_use]
    pub fn truncated(mut self, len: usize) -> Self {
        self.len = self.len.min(u8::try_from(len).unwrap_or(u8::MAX));
        self
    }
}

impl AsRef<[u8]> for StrongSum {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for StrongSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StrongSum(")?;
        for byte in self.as_bytes() {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// Function from a byte chunk to its strong digest.
///
/// The scanner calls [`strong_sum`](Self::strong_sum) only for chunks whose
/// weak checksum hit the table, writing the digest into a reused buffer.
pub trait StrongHasher: Send + Sync {
    /// Writes the digest of `block` into `out`, replacing its contents.
    fn strong_sum(&self, block: &[u8], out: &mut Vec<u8>);
}

impl StrongHasher for StrongAlgorithm {
    fn strong_sum(&self, block: &[u8], out: &mut Vec<u8>) {
        out.clear();
        out.extend_from_slice(self.compute(block).as_bytes());
    }
}

impl<F> StrongHasher for F
where
    F: Fn(&[u8]) -> Vec<u8> + Send + Sync,
{
    fn strong_sum(&self, block: &[u8], out: &mut Vec<u8>) {
        *out = self(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_lengths_match_algorithms() {
        assert_eq!(StrongAlgorithm::Md4.compute(b"x").len(), 16);
        assert_eq!(StrongAlgorithm::Md5.compute(b"x").len(), 16);
        assert_eq!(StrongAlgorithm::Sha1.compute(b"x").len(), 20);
        assert_eq!(StrongAlgorithm::Xxh64 { seed: 7 }.compute(b"x").len(), 8);
    }

    #[test]
    fn compute_matches_streaming_hashers() {
        assert_eq!(
            StrongAlgorithm::Md4.compute(b"block").as_bytes(),
            Md4::digest(b"block")
        );
        assert_eq!(
            StrongAlgorithm::Xxh64 { seed: 3 }.compute(b"block").as_bytes(),
            Xxh64::digest(3, b"block")
        );
    }

    #[test]
    fn parse_accepts_names_case_insensitively() {
        assert_eq!("MD5".parse::<StrongAlgorithm>(), Ok(StrongAlgorithm::Md5));
        assert_eq!("sha1".parse::<StrongAlgorithm>(), Ok(StrongAlgorithm::Sha1));
        assert_eq!(
            "xxh64".parse::<StrongAlgorithm>(),
            Ok(StrongAlgorithm::Xxh64 { seed: 0 })
        );
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let err = "crc32".parse::<StrongAlgorithm>().expect_err("unknown");
        assert_eq!(err.name(), "crc32");
        assert!(err.to_string().contains("crc32"));
    }

    #[test]
    fn truncation_clamps_to_digest_length() {
        let sum = StrongAlgorithm::Md4.compute(b"abc");
        assert_eq!(sum.truncated(4).as_bytes(), &sum.as_bytes()[..4]);
        assert_eq!(sum.truncated(64), sum);
    }

    #[test]
    fn closures_are_strong_hashers() {
        let hasher = |block: &[u8]| block.iter().rev().copied().collect::<Vec<u8>>();
        let mut out = vec![9, 9, 9, 9];
        hasher.strong_sum(b"ab", &mut out);
        assert_eq!(out, b"ba");
    }

    #[test]
    fn algorithm_hasher_replaces_buffer_contents() {
        let mut out = vec![0xff; 40];
        StrongAlgorithm::Md5.strong_sum(b"abc", &mut out);
        assert_eq!(out, Md5::digest(b"abc"));
    }
}
