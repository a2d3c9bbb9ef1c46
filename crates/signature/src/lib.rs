#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `signature` describes the checksums a peer computes over its copy of a
//! file: one [`BlockChecksum`] per fixed-size block, holding the weak rolling
//! checksum, the strong digest and, when the entry could not be produced
//! cleanly, the [`ChecksumError`] captured while producing it.
//!
//! The crate also ships the producers used on that peer's side:
//!
//! - [`generate_block_checksums`] reads a basis sequentially,
//! - [`generate_block_checksums_parallel`] hashes an in-memory basis with
//!   rayon,
//! - [`spawn_checksum_producer`] streams entries over a bounded channel from
//!   a dedicated thread, so the consumer can start draining before the basis
//!   has been fully read.
//!
//! # Invariants
//!
//! - Blocks are fixed-size and non-overlapping; only the final block may be
//!   shorter than [`ChecksumOptions::block_size`].
//! - Block indices start at zero and increase by one per block.
//! - An empty basis yields no checksums.
//!
//! # Examples
//!
//! ```
//! use signature::{ChecksumOptions, generate_block_checksums};
//! use std::num::NonZeroU32;
//!
//! let options = ChecksumOptions::default().with_block_size(NonZeroU32::new(4).unwrap());
//! let blocks = generate_block_checksums(&b"abcdefghij"[..], &options).unwrap();
//!
//! assert_eq!(blocks.len(), 3);
//! assert_eq!(blocks[2].index(), 2);
//! ```

mod block;
mod error;
mod generation;
mod options;
mod parallel;
mod producer;

pub use block::BlockChecksum;
pub use error::ChecksumError;
pub use generation::{checksum_block, generate_block_checksums, read_block};
pub use options::{ChecksumOptions, DEFAULT_BLOCK_SIZE};
pub use parallel::generate_block_checksums_parallel;
pub use producer::{ChecksumProducer, spawn_checksum_producer};
