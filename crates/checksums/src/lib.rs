#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `checksums` hosts the two hash primitives the delta engine is built on:
//!
//! - the weak [`RollingChecksum`], rsync's Adler-32 style `rsum`, used to
//!   cheaply filter candidate blocks, and
//! - the [`strong`] digests used to confirm that a weak candidate really holds
//!   the same bytes.
//!
//! The strong side is pluggable. Anything that implements
//! [`strong::StrongHasher`] can be handed to the scanner, including plain
//! closures of type `Fn(&[u8]) -> Vec<u8>`.
//!
//! # Examples
//!
//! ```
//! use checksums::{RollingChecksum, weak_checksum};
//! use checksums::strong::StrongAlgorithm;
//!
//! let mut rolling = RollingChecksum::new();
//! rolling.update(b"hello");
//! assert_eq!(rolling.value(), weak_checksum(b"hello"));
//!
//! let sum = StrongAlgorithm::Md5.compute(b"hello");
//! assert_eq!(sum.len(), 16);
//! ```

mod rolling;
pub mod strong;

pub use rolling::{RollingChecksum, RollingDigest, weak_checksum};
