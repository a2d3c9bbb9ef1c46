//! XXH64 strong checksum.
//!
//! XXH64 is not cryptographic, but it is fast and its 64-bit output is
//! plenty for confirming a weak match within a single file.

use super::StrongDigest;

/// Streaming XXH64 hasher.
///
/// ```
/// use checksums::strong::Xxh64;
///
/// let mut hasher = Xxh64::new(0);
/// hasher.update(b"chunk 1");
/// hasher.update(b"chunk 2");
/// assert_eq!(hasher.finalize(), Xxh64::digest(0, b"chunk 1chunk 2"));
/// ```
#[derive(Clone)]
pub struct Xxh64 {
    inner: xxhash_rust::xxh64::Xxh64,
}

impl std::fmt::Debug for Xxh64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Xxh64").finish_non_exhaustive()
    }
}

impl Xxh64 {
    /// Creates a hasher with the supplied seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: xxhash_rust::xxh64::Xxh64::new(seed),
        }
    }

    /// Feeds additional bytes into the digest state.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalises the digest, little-endian encoded.
    #[must_use]
    pub fn finalize(self) -> [u8; 8] {
        self.inner.digest().to_le_bytes()
    }

    /// Computes the digest for `data` in one shot.
    #[must_use]
    pub fn digest(seed: u64, data: &[u8]) -> [u8; 8] {
        xxhash_rust::xxh64::xxh64(data, seed).to_le_bytes()
    }
}

impl StrongDigest for Xxh64 {
    type Seed = u64;
    type Digest = [u8; 8];
    const DIGEST_LEN: usize = 8;

    fn with_seed(seed: Self::Seed) -> Self {
        Xxh64::new(seed)
    }

    fn update(&mut self, data: &[u8]) {
        self.update(data);
    }

    fn finalize(self) -> Self::Digest {
        self.finalize()
    }
}
