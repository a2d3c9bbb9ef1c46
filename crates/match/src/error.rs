use std::io;

/// Why a scan was cancelled.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum CancelReason {
    /// The caller asked for the scan to stop.
    #[error("cancelled by caller")]
    Requested,
    /// The deadline attached to the cancellation token passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
    /// Caller-supplied explanation.
    #[error("{0}")]
    Other(String),
}

/// Terminal failure of a delta scan.
///
/// At most one of these is produced per scan, always as the final stream item.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The cancellation token fired before the next chunk was read.
    #[error("delta scan cancelled before operation {index}")]
    Cancelled {
        /// Ordinal the next operation would have received.
        index: u64,
        /// Reason recorded on the token.
        #[source]
        reason: CancelReason,
    },
    /// Reading the local file failed; the whole sync must be restarted.
    #[error("failed reading file at operation {index}")]
    Read {
        /// Ordinal the failed chunk would have received.
        index: u64,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl SyncError {
    /// Returns the ordinal at which the scan stopped.
    #[must_use]
    pub const fn index(&self) -> u64 {
        match self {
            Self::Cancelled { index, .. } | Self::Read { index, .. } => *index,
        }
    }

    /// Reports whether the scan stopped because it was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns the cancellation reason, if the scan was cancelled.
    #[must_use]
    pub const fn cancel_reason(&self) -> Option<&CancelReason> {
        match self {
            Self::Cancelled { reason, .. } => Some(reason),
            Self::Read { .. } => None,
        }
    }
}
