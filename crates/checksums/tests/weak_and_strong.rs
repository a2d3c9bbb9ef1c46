//! Cross-module behaviour of the public checksum API.

use checksums::strong::{Md4, StrongAlgorithm, StrongDigest, StrongHasher};
use checksums::{RollingChecksum, RollingDigest, weak_checksum};

#[test]
fn weak_checksum_matches_known_packed_value() {
    // s1 = 'a' + 'b' + 'c' = 294, s2 = 97 + 195 + 294 = 586
    assert_eq!(weak_checksum(b"abc"), (586 << 16) | 294);
}

#[test]
fn weak_checksum_of_empty_block_is_zero() {
    assert_eq!(weak_checksum(b""), 0);
    assert_eq!(RollingDigest::from_bytes(b""), RollingDigest::ZERO);
}

#[test]
fn weak_checksum_agrees_with_incremental_updates() {
    let data: Vec<u8> = (0..4096u32).map(|i| (i % 253) as u8).collect();
    let mut rolling = RollingChecksum::new();
    for chunk in data.chunks(100) {
        rolling.update(chunk);
    }
    assert_eq!(rolling.value(), weak_checksum(&data));
}

#[test]
fn weak_collision_is_resolved_by_strong_digest() {
    // Byte sums and weighted sums are equal for these two blocks.
    let left = [1u8, 0, 0, 1];
    let right = [0u8, 1, 1, 0];
    assert_eq!(weak_checksum(&left), weak_checksum(&right));

    let algorithm = StrongAlgorithm::Md4;
    assert_ne!(algorithm.compute(&left), algorithm.compute(&right));
}

#[test]
fn algorithm_hasher_and_trait_digest_agree() {
    let mut out = Vec::new();
    StrongAlgorithm::Md4.strong_sum(b"payload", &mut out);
    assert_eq!(out, <Md4 as StrongDigest>::digest(b"payload"));
}
