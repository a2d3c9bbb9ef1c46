//! Lookup table built from the peer's block checksums.

use rustc_hash::FxHashMap;
use signature::BlockChecksum;
use tracing::{debug, warn};

/// Candidate block stored in a [`ChecksumTable`] bucket.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableEntry {
    index: u64,
    strong: Box<[u8]>,
}

impl TableEntry {
    /// Returns the remote block index.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Returns the stored strong digest.
    #[inline]
    #[must_use]
    pub fn strong(&self) -> &[u8] {
        &self.strong
    }

    /// Reports whether `digest` confirms this candidate.
    ///
    /// The stored digest may be a truncated prefix of the full digest; it
    /// matches when it equals the leading bytes of `digest`.
    #[inline]
    #[must_use]
    pub fn matches(&self, digest: &[u8]) -> bool {
        !self.strong.is_empty() && digest.get(..self.strong.len()) == Some(&self.strong[..])
    }
}

/// Counters gathered while building a [`ChecksumTable`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TableStats {
    /// Entries consumed from the input sequence.
    pub received: u64,
    /// Entries stored in the table.
    pub indexed: u64,
    /// Entries that carried a production error.
    pub warnings: u64,
    /// Entries left out because they could never confirm a match.
    pub skipped: u64,
}

/// Remote checksums keyed by weak checksum.
///
/// Each bucket keeps every candidate sharing a weak value, in arrival order.
/// Weak collisions are expected; a hit only counts once the strong digest
/// agrees. When several candidates in a bucket agree, the earliest inserted
/// wins.
#[derive(Clone, Debug, Default)]
pub struct ChecksumTable {
    buckets: FxHashMap<u32, Vec<TableEntry>>,
    stats: TableStats,
}

impl ChecksumTable {
    /// Drains `checksums` completely and indexes every usable entry.
    ///
    /// Entries carrying an error are logged and skipped, whatever digest they
    /// hold. Entries without a strong digest are skipped as well. Neither case
    /// aborts construction.
    pub fn build<I>(checksums: I) -> Self
    where
        I: IntoIterator<Item = BlockChecksum>,
    {
        let mut table = Self::default();
        for checksum in checksums {
            table.insert(checksum);
        }

        debug!(
            target: "delta::table",
            received = table.stats.received,
            indexed = table.stats.indexed,
            buckets = table.buckets.len(),
            warnings = table.stats.warnings,
            skipped = table.stats.skipped,
            "checksum table built"
        );
        table
    }

    fn insert(&mut self, checksum: BlockChecksum) {
        self.stats.received += 1;

        if let Some(error) = checksum.error() {
            self.stats.warnings += 1;
            warn!(target: "delta::table", block = checksum.index(), %error, "block checksum error");
        }

        if !checksum.is_usable() {
            self.stats.skipped += 1;
            return;
        }

        let (index, weak, strong) = checksum.into_parts();
        self.buckets.entry(weak).or_default().push(TableEntry {
            index,
            strong: strong.into_boxed_slice(),
        });
        self.stats.indexed += 1;
    }

    /// Returns the candidates sharing `weak`, in insertion order.
    #[must_use]
    pub fn candidates(&self, weak: u32) -> &[TableEntry] {
        self.buckets.get(&weak).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the earliest inserted candidate for `weak` confirmed by `digest`.
    #[must_use]
    pub fn find(&self, weak: u32, digest: &[u8]) -> Option<&TableEntry> {
        self.candidates(weak)
            .iter()
            .find(|entry| entry.matches(digest))
    }

    /// Returns the number of indexed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Returns `true` when no entry was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Returns the number of distinct weak checksums.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the counters gathered during [`build`](Self::build).
    #[must_use]
    pub const fn stats(&self) -> TableStats {
        self.stats
    }
}

impl FromIterator<BlockChecksum> for ChecksumTable {
    fn from_iter<I: IntoIterator<Item = BlockChecksum>>(iter: I) -> Self {
        Self::build(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signature::ChecksumError;

    fn entry_indices(entries: &[TableEntry]) -> Vec<u64> {
        entries.iter().map(TableEntry::index).collect()
    }

    #[test]
    fn buckets_keep_insertion_order() {
        let table = ChecksumTable::build([
            BlockChecksum::new(4, 7, vec![1]),
            BlockChecksum::new(1, 7, vec![2]),
            BlockChecksum::new(9, 8, vec![3]),
            BlockChecksum::new(2, 7, vec![4]),
        ]);

        assert_eq!(entry_indices(table.candidates(7)), [4, 1, 2]);
        assert_eq!(entry_indices(table.candidates(8)), [9]);
        assert!(table.candidates(6).is_empty());
        assert_eq!(table.len(), 4);
        assert_eq!(table.bucket_count(), 2);
    }

    #[test]
    fn earliest_matching_candidate_wins() {
        let table: ChecksumTable = [
            BlockChecksum::new(10, 1, vec![0xaa]),
            BlockChecksum::new(11, 1, vec![0xbb]),
            BlockChecksum::new(12, 1, vec![0xbb]),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.find(1, &[0xbb]).map(TableEntry::index), Some(11));
        assert_eq!(table.find(1, &[0xcc]), None);
        assert_eq!(table.find(2, &[0xbb]), None);
    }

    #[test]
    fn truncated_digests_match_by_prefix() {
        let table = ChecksumTable::build([BlockChecksum::new(0, 5, vec![1, 2])]);
        assert!(table.find(5, &[1, 2, 3, 4]).is_some());
        assert!(table.find(5, &[1]).is_none());
        assert!(table.find(5, &[2, 1, 3]).is_none());
    }

    #[test]
    fn erroneous_entries_warn_and_are_never_indexed() {
        let error = ChecksumError::StrongLength {
            index: 0,
            expected: 16,
            actual: 2,
        };
        let table = ChecksumTable::build([
            BlockChecksum::failed(0, 3, vec![9, 9], error),
            BlockChecksum::new(1, 4, vec![8]),
        ]);

        assert!(table.candidates(3).is_empty());
        assert!(table.find(3, &[9, 9, 0, 0]).is_none());
        assert_eq!(entry_indices(table.candidates(4)), [1]);
        let stats = table.stats();
        assert_eq!(stats.received, 2);
        assert_eq!(stats.indexed, 1);
        assert_eq!(stats.warnings, 1);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn unusable_entries_are_skipped() {
        let error = ChecksumError::Read {
            index: 1,
            message: "eof".to_owned(),
        };
        let table = ChecksumTable::build([
            BlockChecksum::new(0, 3, Vec::new()),
            BlockChecksum::failed(1, 3, Vec::new(), error),
        ]);

        assert!(table.is_empty());
        assert_eq!(table.stats().skipped, 2);
        assert_eq!(table.stats().warnings, 1);
        assert!(table.find(3, &[]).is_none());
    }
}
