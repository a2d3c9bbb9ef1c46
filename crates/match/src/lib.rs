#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Block matching and delta emission for the sending side of a sync.
//!
//! This crate turns a local file plus the peer's block checksums into an
//! ordered stream of operations, each either "reuse your block N" or "here are
//! literal bytes":
//!
//! - [`ChecksumTable`] indexes the peer's [`BlockChecksum`]s by weak checksum,
//!   keeping every candidate that shares a weak value.
//! - [`DeltaScanner`] reads the local file one block at a time, verifies weak
//!   hits against the strong digest and emits a [`BlockOperation`] per chunk.
//! - [`sync`] ties the two together: it drains the checksum sequence into a
//!   table, then runs the scanner on its own thread and hands back a
//!   [`DeltaStream`].
//!
//! # Design
//!
//! Matching happens at block-aligned offsets of the local file only. The table
//! is complete before scanning starts and is shared read-only with the scanner
//! thread. Operations cross a zero-capacity channel, so a slow consumer
//! throttles how fast the local file is read.
//!
//! A stream ends either by closing (the local file was fully scanned) or with
//! exactly one `Err` item: [`SyncError::Cancelled`] when the
//! [`CancellationToken`] fired, [`SyncError::Read`] when the local file could
//! not be read. Nothing follows the error, and a consumer must not trust the
//! operations before it as a complete delta.
//!
//! # Examples
//!
//! ```
//! use checksums::strong::StrongAlgorithm;
//! use matching::{CancellationToken, Operation, ScanConfig, sync};
//! use signature::{ChecksumOptions, generate_block_checksums};
//! use std::io::Cursor;
//! use std::num::NonZeroU32;
//!
//! let options = ChecksumOptions::new().with_block_size(NonZeroU32::new(4).unwrap());
//! let remote = generate_block_checksums(&b"AAAABBBB"[..], &options).unwrap();
//!
//! let stream = sync(
//!     Cursor::new(b"AAAABBBBCCCC".to_vec()),
//!     StrongAlgorithm::Md4,
//!     remote,
//!     CancellationToken::never(),
//!     ScanConfig::from(&options),
//! )
//! .unwrap();
//!
//! let ops: Vec<_> = stream.map(|item| item.unwrap().into_operation()).collect();
//! assert_eq!(ops[0], Operation::Reuse { block: 0, len: 4 });
//! assert_eq!(ops[1], Operation::Reuse { block: 1, len: 4 });
//! assert_eq!(ops[2], Operation::Literal(b"CCCC".to_vec()));
//! ```

mod cancel;
mod error;
mod operation;
mod scanner;
mod stream;
mod summary;
mod table;

pub use cancel::CancellationToken;
pub use error::{CancelReason, SyncError};
pub use operation::{BlockOperation, Operation};
pub use scanner::{DeltaScanner, ScanConfig, ScanOutcome};
pub use signature::BlockChecksum;
pub use stream::{DeltaStream, sync};
pub use summary::{DeltaSummary, collect_delta};
pub use table::{ChecksumTable, TableEntry, TableStats};
