//! Receiving side of a running scan.

use std::io::{self, Read};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use checksums::strong::StrongHasher;
use crossbeam_channel::Receiver;
use signature::BlockChecksum;

use crate::cancel::CancellationToken;
use crate::error::SyncError;
use crate::operation::BlockOperation;
use crate::scanner::{DeltaScanner, ScanConfig, ScanOutcome};
use crate::table::ChecksumTable;

/// Ordered operations produced by a scanner thread.
///
/// Each call to [`next`](Iterator::next) blocks until the scanner has
/// produced the next item. The iterator ends when the scan completes, or right
/// after the single `Err` item that terminates a failed or cancelled scan.
///
/// Dropping the stream early disconnects the scanner, which stops at its next
/// hand-off; the thread is joined before `drop` returns.
#[derive(Debug)]
pub struct DeltaStream {
    receiver: Option<Receiver<Result<BlockOperation, SyncError>>>,
    handle: Option<JoinHandle<ScanOutcome>>,
}

impl DeltaStream {
    pub(crate) const fn new(
        receiver: Receiver<Result<BlockOperation, SyncError>>,
        handle: JoinHandle<ScanOutcome>,
    ) -> Self {
        Self {
            receiver: Some(receiver),
            handle: Some(handle),
        }
    }

    /// Stops consuming and waits for the scanner thread, returning how the scan ended.
    ///
    /// Items not yet received are discarded.
    pub fn finish(mut self) -> thread::Result<ScanOutcome> {
        self.receiver.take();
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Ok(ScanOutcome::Disconnected { operations: 0 }),
        }
    }
}

impl Iterator for DeltaStream {
    type Item = Result<BlockOperation, SyncError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.receiver.as_ref()?.recv().ok();
        if item.is_none() {
            self.receiver.take();
        }
        item
    }
}

impl Drop for DeltaStream {
    fn drop(&mut self) {
        self.receiver.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Builds the checksum table from `checksums`, then scans `reader` on a new thread.
///
/// The checksum sequence is drained to the end on the calling thread before
/// the first byte of `reader` is read, so every bucket is complete when
/// matching starts. `checksums` may be a collection or a channel receiver fed
/// by a concurrent producer.
///
/// # Errors
///
/// Returns an error only when the scanner thread cannot be spawned. Failures
/// while scanning arrive through the stream.
pub fn sync<R, H, I>(
    reader: R,
    hasher: H,
    checksums: I,
    cancel: CancellationToken,
    config: ScanConfig,
) -> io::Result<DeltaStream>
where
    R: Read + Send + 'static,
    H: StrongHasher + 'static,
    I: IntoIterator<Item = BlockChecksum>,
{
    let table = Arc::new(ChecksumTable::build(checksums));
    DeltaScanner::new(table, hasher, config).spawn(reader, cancel)
}
