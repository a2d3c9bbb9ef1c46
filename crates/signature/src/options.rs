//! crates/signature/src/options.rs
//!
//! Parameters shared by the checksum producer and the scanner.

use std::num::{NonZeroU8, NonZeroU32};

use checksums::strong::StrongAlgorithm;

/// Default block length, matching rsync's `BLOCK_SIZE`.
pub const DEFAULT_BLOCK_SIZE: NonZeroU32 = NonZeroU32::new(700).unwrap();

/// How a basis file is cut into blocks and hashed.
///
/// Both peers must agree on `block_size`; otherwise no chunk on the sending
/// side ever lines up with a block on the receiving side.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChecksumOptions {
    block_size: NonZeroU32,
    algorithm: StrongAlgorithm,
    strong_len: Option<NonZeroU8>,
}

impl Default for ChecksumOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ChecksumOptions {
    /// Creates options with the default block size and MD4 strong digests.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            algorithm: StrongAlgorithm::Md4,
            strong_len: None,
        }
    }

    /// Overrides the block size.
    #[must_use]
    pub const fn with_block_size(mut self, block_size: NonZeroU32) -> Self {
        self.block_size = block_size;
        self
    }

    /// Overrides the strong checksum algorithm.
    #[must_use]
    pub const fn with_algorithm(mut self, algorithm: StrongAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Truncates strong digests to `len` bytes (rsync's `s2length`).
    #[must_use]
    pub const fn with_strong_len(mut self, len: NonZeroU8) -> Self {
        self.strong_len = Some(len);
        self
    }

    /// Returns the block size.
    #[must_use]
    pub const fn block_size(&self) -> NonZeroU32 {
        self.block_size
    }

    /// Returns the block size as a buffer length.
    #[must_use]
    pub const fn block_len(&self) -> usize {
        self.block_size.get() as usize
    }

    /// Returns the strong checksum algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> StrongAlgorithm {
        self.algorithm
    }

    /// Returns the number of strong digest bytes kept per block.
    ///
    /// A requested truncation longer than the digest is clamped.
    #[must_use]
    pub fn strong_len(&self) -> usize {
        let full = self.algorithm.digest_len();
        self.strong_len
            .map_or(full, |len| usize::from(len.get()).min(full))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_rsync_block_size_and_md4() {
        let options = ChecksumOptions::default();
        assert_eq!(options.block_size().get(), 700);
        assert_eq!(options.block_len(), 700);
        assert_eq!(options.algorithm(), StrongAlgorithm::Md4);
        assert_eq!(options.strong_len(), 16);
    }

    #[test]
    fn strong_len_is_clamped_to_digest() {
        let options = ChecksumOptions::new()
            .with_algorithm(StrongAlgorithm::Xxh64 { seed: 0 })
            .with_strong_len(NonZeroU8::new(16).unwrap());
        assert_eq!(options.strong_len(), 8);

        let options = options.with_strong_len(NonZeroU8::new(2).unwrap());
        assert_eq!(options.strong_len(), 2);
    }
}
