//! Strong checksums used to confirm weak-checksum candidates.
//!
//! Each algorithm exposes a streaming hasher implementing [`StrongDigest`].
//! [`StrongAlgorithm`] selects one at runtime and [`StrongHasher`] is the
//! object-safe seam the scanner consumes, so callers may plug in their own
//! digest function instead.

mod algorithm;
mod md4;
mod md5;
mod sha1;
mod xxhash;

pub use algorithm::{StrongAlgorithm, StrongAlgorithmParseError, StrongHasher, StrongSum};
pub use md4::Md4;
pub use md5::Md5;
pub use sha1::Sha1;
pub use xxhash::Xxh64;

/// Streaming strong digest.
pub trait StrongDigest: Sized {
    /// Seed type accepted by [`with_seed`](Self::with_seed). `()` for unseeded algorithms.
    type Seed: Default;
    /// Fixed-size digest output.
    type Digest: AsRef<[u8]> + Copy;
    /// Length of [`Self::Digest`] in bytes.
    const DIGEST_LEN: usize;

    /// Creates a hasher primed with `seed`.
    fn with_seed(seed: Self::Seed) -> Self;

    /// Feeds additional bytes into the digest state.
    fn update(&mut self, data: &[u8]);

    /// Finalises the digest.
    fn finalize(self) -> Self::Digest;

    /// Computes the digest of `data` with the default seed.
    fn digest(data: &[u8]) -> Self::Digest {
        Self::digest_with_seed(Self::Seed::default(), data)
    }

    /// Computes the digest of `data` with an explicit seed.
    fn digest_with_seed(seed: Self::Seed, data: &[u8]) -> Self::Digest {
        let mut hasher = Self::with_seed(seed);
        hasher.update(data);
        hasher.finalize()
    }
}

#[cfg(test)]
pub(crate) fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut out, "{byte:02x}").expect("write! to String cannot fail");
    }
    out
}
