//! Inline collection of a whole delta.

use std::io::Read;
use std::ops::ControlFlow;
use std::sync::Arc;

use checksums::strong::StrongHasher;
use signature::BlockChecksum;

use crate::cancel::CancellationToken;
use crate::error::SyncError;
use crate::operation::{BlockOperation, Operation};
use crate::scanner::{DeltaScanner, ScanConfig};
use crate::table::ChecksumTable;

/// Every operation of a finished scan, with byte accounting.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DeltaSummary {
    operations: Vec<BlockOperation>,
    reused_blocks: u64,
    literal_bytes: u64,
    total_bytes: u64,
}

impl DeltaSummary {
    /// Records the next operation of the stream.
    pub fn push(&mut self, operation: BlockOperation) {
        let len = operation.operation().byte_len() as u64;
        match operation.operation() {
            Operation::Reuse { .. } => self.reused_blocks += 1,
            Operation::Literal(_) => self.literal_bytes += len,
        }
        self.total_bytes += len;
        self.operations.push(operation);
    }

    /// Returns the operations in stream order.
    #[must_use]
    pub fn operations(&self) -> &[BlockOperation] {
        &self.operations
    }

    /// Consumes the summary, returning its operations.
    #[must_use]
    pub fn into_operations(self) -> Vec<BlockOperation> {
        self.operations
    }

    /// Returns how many chunks reuse a remote block.
    #[must_use]
    pub const fn reused_blocks(&self) -> u64 {
        self.reused_blocks
    }

    /// Returns how many bytes travel as literals.
    #[must_use]
    pub const fn literal_bytes(&self) -> u64 {
        self.literal_bytes
    }

    /// Returns the size of the scanned file.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Returns how many bytes the receiver copies from its own file.
    #[must_use]
    pub const fn copy_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.literal_bytes)
    }
}

impl FromIterator<BlockOperation> for DeltaSummary {
    fn from_iter<I: IntoIterator<Item = BlockOperation>>(iter: I) -> Self {
        let mut summary = Self::default();
        for operation in iter {
            summary.push(operation);
        }
        summary
    }
}

impl<H: StrongHasher> DeltaScanner<H> {
    /// Scans `reader` on the calling thread and gathers the whole delta.
    ///
    /// # Errors
    ///
    /// Returns the terminal [`SyncError`] if the scan was cancelled or a read
    /// failed; operations produced before it are discarded.
    pub fn collect<R: Read>(
        &self,
        reader: R,
        cancel: &CancellationToken,
    ) -> Result<DeltaSummary, SyncError> {
        let mut summary = DeltaSummary::default();
        let mut failure = None;

        self.scan(reader, cancel, |item| match item {
            Ok(operation) => {
                summary.push(operation);
                ControlFlow::Continue(())
            }
            Err(error) => {
                failure = Some(error);
                ControlFlow::Break(())
            }
        });

        match failure {
            Some(error) => Err(error),
            None => Ok(summary),
        }
    }
}

/// Builds the table and collects the delta for `reader` without spawning a thread.
///
/// # Errors
///
/// Returns the terminal [`SyncError`] of the scan, if any.
pub fn collect_delta<R, H, I>(
    reader: R,
    hasher: H,
    checksums: I,
    cancel: &CancellationToken,
    config: ScanConfig,
) -> Result<DeltaSummary, SyncError>
where
    R: Read,
    H: StrongHasher,
    I: IntoIterator<Item = BlockChecksum>,
{
    let table = Arc::new(ChecksumTable::build(checksums));
    DeltaScanner::new(table, hasher, config).collect(reader, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_accounts_bytes_per_variant() {
        let summary: DeltaSummary = [
            BlockOperation::new(0, Operation::Reuse { block: 0, len: 700 }),
            BlockOperation::new(1, Operation::Literal(vec![0; 300])),
            BlockOperation::new(2, Operation::Reuse { block: 5, len: 700 }),
        ]
        .into_iter()
        .collect();

        assert_eq!(summary.operations().len(), 3);
        assert_eq!(summary.reused_blocks(), 2);
        assert_eq!(summary.literal_bytes(), 300);
        assert_eq!(summary.total_bytes(), 1_700);
        assert_eq!(summary.copy_bytes(), 1_400);
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let summary = DeltaSummary::default();
        assert!(summary.into_operations().is_empty());
    }
}
