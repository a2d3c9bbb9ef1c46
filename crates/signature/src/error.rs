//! crates/signature/src/error.rs
//!
//! Failures captured while producing an individual block checksum.

/// Problem recorded on a single [`BlockChecksum`](crate::BlockChecksum).
///
/// These never abort table construction on the sending side. An entry carrying
/// one is not [usable](crate::BlockChecksum::is_usable), so the table skips it
/// and the block is never matched, whatever digest bytes it holds.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ChecksumError {
    /// Reading the basis block failed.
    #[error("failed reading basis block {index}: {message}")]
    Read {
        /// Index of the block being read.
        index: u64,
        /// Rendered I/O error.
        message: String,
    },
    /// The strong digest does not have the negotiated length.
    #[error("strong checksum for block {index} is {actual} bytes, expected {expected}")]
    StrongLength {
        /// Index of the offending block.
        index: u64,
        /// Negotiated digest length.
        expected: usize,
        /// Length actually received.
        actual: usize,
    },
    /// The entry could not be decoded.
    #[error("malformed checksum for block {index}: {reason}")]
    Malformed {
        /// Index of the offending block.
        index: u64,
        /// Why the entry was rejected.
        reason: String,
    },
}

impl ChecksumError {
    /// Wraps an I/O failure raised while reading block `index`.
    #[must_use]
    pub fn read(index: u64, error: &std::io::Error) -> Self {
        Self::Read {
            index,
            message: error.to_string(),
        }
    }

    /// Returns the block index the error refers to.
    #[must_use]
    pub const fn index(&self) -> u64 {
        match self {
            Self::Read { index, .. }
            | Self::StrongLength { index, .. }
            | Self::Malformed { index, .. } => *index,
        }
    }
}
