//! crates/signature/src/block.rs
//!
//! Checksum pair for one remote block.

use crate::error::ChecksumError;

/// Weak and strong checksum of one block of the peer's file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlockChecksum {
    index: u64,
    weak: u32,
    strong: Vec<u8>,
    error: Option<ChecksumError>,
}

impl BlockChecksum {
    /// Creates a cleanly produced entry.
    #[must_use]
    pub const fn new(index: u64, weak: u32, strong: Vec<u8>) -> Self {
        Self {
            index,
            weak,
            strong,
            error: None,
        }
    }

    /// Creates an entry carrying the failure captured while producing it.
    #[must_use]
    pub const fn failed(index: u64, weak: u32, strong: Vec<u8>, error: ChecksumError) -> Self {
        Self {
            index,
            weak,
            strong,
            error: Some(error),
        }
    }

    /// Returns the zero-based block ordinal on the peer's side.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Returns the packed weak checksum.
    #[inline]
    #[must_use]
    pub const fn weak(&self) -> u32 {
        self.weak
    }

    /// Returns the strong digest bytes.
    #[inline]
    #[must_use]
    pub fn strong(&self) -> &[u8] {
        &self.strong
    }

    /// Returns the failure captured while this entry was produced, if any.
    #[inline]
    #[must_use]
    pub const fn error(&self) -> Option<&ChecksumError> {
        self.error.as_ref()
    }

    /// Reports whether the entry can ever confirm a match.
    ///
    /// An entry without a strong digest cannot verify a weak hit, and a digest
    /// produced alongside an error is not trusted.
    #[inline]
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.error.is_none() && !self.strong.is_empty()
    }

    /// Splits the entry into index, weak checksum and strong digest, dropping any error.
    #[must_use]
    pub fn into_parts(self) -> (u64, u32, Vec<u8>) {
        (self.index, self.weak, self.strong)
    }
}
