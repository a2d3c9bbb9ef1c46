//! Chunk-aligned scan of the local file against a [`ChecksumTable`].

use std::io::{self, Read};
use std::num::NonZeroU32;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread;

use checksums::strong::StrongHasher;
use checksums::weak_checksum;
use crossbeam_channel::bounded;
use signature::{ChecksumOptions, DEFAULT_BLOCK_SIZE, read_block};
use tracing::{debug, trace, warn};

use crate::cancel::CancellationToken;
use crate::error::SyncError;
use crate::operation::{BlockOperation, Operation};
use crate::stream::DeltaStream;
use crate::table::ChecksumTable;

/// Scanner configuration.
///
/// `block_size` must equal the block size the peer used for its checksums.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScanConfig {
    block_size: NonZeroU32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE)
    }
}

impl ScanConfig {
    /// Creates a configuration reading chunks of `block_size` bytes.
    #[must_use]
    pub const fn new(block_size: NonZeroU32) -> Self {
        Self { block_size }
    }

    /// Returns the chunk size.
    #[must_use]
    pub const fn block_size(&self) -> NonZeroU32 {
        self.block_size
    }

    /// Returns the chunk size as a buffer length.
    #[must_use]
    pub const fn block_len(&self) -> usize {
        self.block_size.get() as usize
    }
}

impl From<&ChecksumOptions> for ScanConfig {
    fn from(options: &ChecksumOptions) -> Self {
        Self::new(options.block_size())
    }
}

/// How a scan ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScanOutcome {
    /// The local file was read to the end.
    Completed {
        /// Number of operations emitted.
        operations: u64,
    },
    /// The cancellation token fired; a [`SyncError::Cancelled`] was emitted last.
    Cancelled {
        /// Number of operations emitted before the error.
        operations: u64,
    },
    /// Reading failed; a [`SyncError::Read`] was emitted last.
    Failed {
        /// Number of operations emitted before the error.
        operations: u64,
    },
    /// The consumer stopped accepting operations.
    Disconnected {
        /// Number of operations the consumer accepted.
        operations: u64,
    },
}

impl ScanOutcome {
    /// Returns the number of operations emitted, excluding any terminal error.
    #[must_use]
    pub const fn operations(self) -> u64 {
        match self {
            Self::Completed { operations }
            | Self::Cancelled { operations }
            | Self::Failed { operations }
            | Self::Disconnected { operations } => operations,
        }
    }
}

/// Produces one [`BlockOperation`] per block-sized chunk of a local file.
///
/// Chunks start at multiples of the block size; only the last chunk may be
/// shorter. A chunk becomes a reuse when its weak checksum hits the table and
/// the strong digest confirms one of the candidates, and a literal otherwise,
/// including on a weak collision that the strong digest rejects.
#[derive(Debug)]
pub struct DeltaScanner<H> {
    table: Arc<ChecksumTable>,
    hasher: H,
    config: ScanConfig,
}

impl<H: StrongHasher> DeltaScanner<H> {
    /// Creates a scanner over a finished table.
    #[must_use]
    pub const fn new(table: Arc<ChecksumTable>, hasher: H, config: ScanConfig) -> Self {
        Self {
            table,
            hasher,
            config,
        }
    }

    /// Returns the table the scanner matches against.
    #[must_use]
    pub fn table(&self) -> &ChecksumTable {
        &self.table
    }

    /// Returns the scanner configuration.
    #[must_use]
    pub const fn config(&self) -> ScanConfig {
        self.config
    }

    /// Scans `reader` on the calling thread, handing every item to `emit`.
    ///
    /// Cancellation is checked before each chunk is read. On cancellation or a
    /// read failure exactly one `Err` item is emitted and the scan stops. When
    /// `emit` breaks, the scan stops without emitting anything else.
    pub fn scan<R, F>(&self, mut reader: R, cancel: &CancellationToken, mut emit: F) -> ScanOutcome
    where
        R: Read,
        F: FnMut(Result<BlockOperation, SyncError>) -> ControlFlow<()>,
    {
        let mut buffer = vec![0u8; self.config.block_len()];
        let mut digest = Vec::new();
        let mut index = 0u64;

        debug!(
            target: "delta::scan",
            block_size = self.config.block_len(),
            candidates = self.table.len(),
            "starting delta scan"
        );

        loop {
            if let Some(reason) = cancel.reason() {
                debug!(target: "delta::scan", index, %reason, "delta scan cancelled");
                let _ = emit(Err(SyncError::Cancelled { index, reason }));
                return ScanOutcome::Cancelled { operations: index };
            }

            let n = match read_block(&mut reader, &mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(source) => {
                    warn!(target: "delta::scan", index, error = %source, "local read failed, full re-sync required");
                    let _ = emit(Err(SyncError::Read { index, source }));
                    return ScanOutcome::Failed { operations: index };
                }
            };

            let operation = self.match_chunk(&buffer[..n], &mut digest);
            trace!(target: "delta::scan", index, ?operation, "emitting operation");

            if emit(Ok(BlockOperation::new(index, operation))).is_break() {
                debug!(target: "delta::scan", index, "delta consumer went away");
                return ScanOutcome::Disconnected { operations: index };
            }
            index += 1;

            if n < buffer.len() {
                break;
            }
        }

        debug!(target: "delta::scan", operations = index, "delta scan completed");
        ScanOutcome::Completed { operations: index }
    }

    fn match_chunk(&self, chunk: &[u8], digest: &mut Vec<u8>) -> Operation {
        let weak = weak_checksum(chunk);
        let candidates = self.table.candidates(weak);

        if !candidates.is_empty() {
            self.hasher.strong_sum(chunk, digest);
            if let Some(entry) = candidates.iter().find(|entry| entry.matches(digest)) {
                return Operation::Reuse {
                    block: entry.index(),
                    len: chunk.len(),
                };
            }
            trace!(target: "delta::scan", weak, candidates = candidates.len(), "weak checksum collision");
        }

        Operation::Literal(chunk.to_vec())
    }
}

impl<H: StrongHasher + 'static> DeltaScanner<H> {
    /// Runs the scan on a dedicated thread and returns the receiving stream.
    ///
    /// Operations are handed over one at a time through a zero-capacity
    /// channel, so the scanner only reads ahead by the chunk it is trying to
    /// deliver.
    ///
    /// # Errors
    ///
    /// Returns an error when the scanner thread cannot be spawned.
    pub fn spawn<R>(self, reader: R, cancel: CancellationToken) -> io::Result<DeltaStream>
    where
        R: Read + Send + 'static,
    {
        let (sender, receiver) = bounded(0);

        let handle = thread::Builder::new()
            .name("delta-scanner".to_owned())
            .spawn(move || {
                self.scan(reader, &cancel, |item| {
                    if sender.send(item).is_ok() {
                        ControlFlow::Continue(())
                    } else {
                        ControlFlow::Break(())
                    }
                })
            })?;

        Ok(DeltaStream::new(receiver, handle))
    }
}
