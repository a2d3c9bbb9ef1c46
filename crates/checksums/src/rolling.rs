//! rsync's weak block checksum (`rsum`).
//!
//! The checksum keeps two 16-bit sums over a block: `sum1` adds up the bytes
//! and `sum2` adds up the running values of `sum1`. Both wrap at 2^16. The
//! packed form puts `sum2` in the high half and `sum1` in the low half.

/// Weak checksum components of a block, plus the number of bytes they cover.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct RollingDigest {
    sum1: u16,
    sum2: u16,
    len: usize,
}

impl RollingDigest {
    /// Digest of the empty block.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Creates a digest from its components.
    #[must_use]
    pub const fn new(sum1: u16, sum2: u16, len: usize) -> Self {
        Self { sum1, sum2, len }
    }

    /// Computes the digest of `block`.
    #[must_use]
    pub fn from_bytes(block: &[u8]) -> Self {
        let mut checksum = RollingChecksum::new();
        checksum.update(block);
        checksum.digest()
    }

    /// Returns the byte sum.
    #[must_use]
    pub const fn sum1(self) -> u16 {
        self.sum1
    }

    /// Returns the sum of running byte sums.
    #[must_use]
    pub const fn sum2(self) -> u16 {
        self.sum2
    }

    /// Returns how many bytes were summed.
    #[must_use]
    pub const fn len(self) -> usize {
        self.len
    }

    /// Reports whether no bytes were summed.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Returns the packed value `(sum2 << 16) | sum1`.
    #[must_use]
    pub const fn value(self) -> u32 {
        ((self.sum2 as u32) << 16) | self.sum1 as u32
    }
}

/// Incremental weak checksum; feeding a block in pieces gives the same result
/// as feeding it at once.
#[doc(alias = "rsum")]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RollingChecksum {
    digest: RollingDigest,
}

impl RollingChecksum {
    /// Creates a checksum over zero bytes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            digest: RollingDigest::ZERO,
        }
    }

    /// Appends `bytes` to the summed block.
    pub fn update(&mut self, bytes: &[u8]) {
        let RollingDigest {
            mut sum1,
            mut sum2,
            len,
        } = self.digest;
        for &byte in bytes {
            sum1 = sum1.wrapping_add(u16::from(byte));
            sum2 = sum2.wrapping_add(sum1);
        }
        self.digest = RollingDigest::new(sum1, sum2, len.saturating_add(bytes.len()));
    }

    /// Returns the number of bytes summed so far.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.digest.len
    }

    /// Reports whether nothing was summed yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.digest.is_empty()
    }

    /// Returns the current components.
    #[must_use]
    pub const fn digest(&self) -> RollingDigest {
        self.digest
    }

    /// Returns the packed checksum.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.digest.value()
    }
}

/// Packed weak checksum of `block`, as stored in a block checksum entry.
#[must_use]
pub fn weak_checksum(block: &[u8]) -> u32 {
    RollingDigest::from_bytes(block).value()
}
