//! crates/signature/src/generation.rs
//!
//! Sequential block checksum generation.

use std::io::{self, Read};
use std::ops::ControlFlow;

use checksums::weak_checksum;
use tracing::{debug, instrument};

use crate::block::BlockChecksum;
use crate::options::ChecksumOptions;

/// Reads until `buffer` is full or the reader reports end of input.
///
/// Short reads are coalesced and [`io::ErrorKind::Interrupted`] is retried, so
/// the returned length is smaller than `buffer.len()` only at end of input.
/// A return value of zero means the reader was already exhausted.
pub fn read_block<R: Read + ?Sized>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

/// Computes the checksum entry for a single block.
#[must_use]
pub fn checksum_block(index: u64, block: &[u8], options: &ChecksumOptions) -> BlockChecksum {
    let strong = options
        .algorithm()
        .compute(block)
        .truncated(options.strong_len());
    BlockChecksum::new(index, weak_checksum(block), strong.as_bytes().to_vec())
}

/// Generates one [`BlockChecksum`] per block of `reader`.
///
/// # Errors
///
/// Propagates the first I/O error raised by the reader.
pub fn generate_block_checksums<R: Read>(
    reader: R,
    options: &ChecksumOptions,
) -> io::Result<Vec<BlockChecksum>> {
    let mut blocks = Vec::new();
    for_each_block(reader, options, |block| {
        blocks.push(block);
        ControlFlow::Continue(())
    })
    .map_err(|(_, err)| err)?;
    Ok(blocks)
}

/// Feeds each block checksum to `sink` until the input ends or `sink` breaks.
///
/// On failure the index of the block being read is returned with the error.
#[instrument(level = "debug", skip_all, fields(block_size = options.block_len(), algorithm = %options.algorithm()))]
pub(crate) fn for_each_block<R, F>(
    mut reader: R,
    options: &ChecksumOptions,
    mut sink: F,
) -> Result<u64, (u64, io::Error)>
where
    R: Read,
    F: FnMut(BlockChecksum) -> ControlFlow<()>,
{
    let mut buffer = vec![0u8; options.block_len()];
    let mut index = 0u64;

    loop {
        let n = read_block(&mut reader, &mut buffer).map_err(|err| (index, err))?;
        if n == 0 {
            break;
        }

        if sink(checksum_block(index, &buffer[..n], options)).is_break() {
            debug!(index, "block checksum consumer went away");
            break;
        }
        index += 1;

        if n < buffer.len() {
            break;
        }
    }

    debug!(blocks = index, "generated block checksums");
    Ok(index)
}
