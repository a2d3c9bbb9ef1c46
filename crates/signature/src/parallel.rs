//! crates/signature/src/parallel.rs
//!
//! Parallel block checksum generation using rayon.
//!
//! The whole basis must already be in memory. For large bases where the
//! strong digest dominates, hashing blocks concurrently outweighs the cost of
//! holding the buffer.

use rayon::prelude::*;

use crate::block::BlockChecksum;
use crate::generation::checksum_block;
use crate::options::ChecksumOptions;

/// Computes block checksums for `data` in parallel.
///
/// The result is identical, entry for entry and in the same order, to
/// [`generate_block_checksums`](crate::generate_block_checksums) over the same
/// bytes.
#[must_use]
pub fn generate_block_checksums_parallel(
    data: &[u8],
    options: &ChecksumOptions,
) -> Vec<BlockChecksum> {
    data.par_chunks(options.block_len())
        .enumerate()
        .map(|(index, block)| checksum_block(index as u64, block, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate_block_checksums;
    use checksums::strong::StrongAlgorithm;
    use std::num::NonZeroU32;

    #[test]
    fn parallel_matches_sequential() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i * 7 % 251) as u8).collect();
        let options = ChecksumOptions::new()
            .with_block_size(NonZeroU32::new(333).unwrap())
            .with_algorithm(StrongAlgorithm::Sha1);

        let sequential = generate_block_checksums(&data[..], &options).expect("blocks");
        let parallel = generate_block_checksums_parallel(&data, &options);
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn empty_basis_has_no_blocks() {
        assert!(generate_block_checksums_parallel(&[], &ChecksumOptions::default()).is_empty());
    }
}
