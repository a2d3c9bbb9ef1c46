/// What the receiver should do for one chunk of the local file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Operation {
    /// Copy block `block` of the receiver's existing file.
    Reuse {
        /// Index of the remote block, as carried by its
        /// [`BlockChecksum`](crate::BlockChecksum). Zero is a valid block.
        block: u64,
        /// Number of local bytes this block stands for.
        len: usize,
    },
    /// Write these bytes verbatim.
    Literal(Vec<u8>),
}

impl Operation {
    /// Returns the number of bytes of the local file this operation covers.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Reuse { len, .. } => *len,
            Self::Literal(bytes) => bytes.len(),
        }
    }

    /// Returns the referenced remote block, if this is a reuse.
    #[must_use]
    pub const fn reused_block(&self) -> Option<u64> {
        match self {
            Self::Reuse { block, .. } => Some(*block),
            Self::Literal(_) => None,
        }
    }

    /// Returns the literal payload, if any.
    #[must_use]
    pub fn literal(&self) -> Option<&[u8]> {
        match self {
            Self::Literal(bytes) => Some(bytes),
            Self::Reuse { .. } => None,
        }
    }
}

/// One entry of the delta stream: the operation for chunk number `index`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlockOperation {
    index: u64,
    operation: Operation,
}

impl BlockOperation {
    /// Pairs an operation with its stream ordinal.
    #[must_use]
    pub const fn new(index: u64, operation: Operation) -> Self {
        Self { index, operation }
    }

    /// Returns the zero-based position of this operation in the stream.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Returns the operation.
    #[inline]
    #[must_use]
    pub const fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Consumes the entry, returning the operation.
    #[must_use]
    pub fn into_operation(self) -> Operation {
        self.operation
    }

    /// Returns `true` when the chunk reuses a remote block.
    #[must_use]
    pub const fn is_reuse(&self) -> bool {
        matches!(self.operation, Operation::Reuse { .. })
    }

    /// Returns `true` when the chunk is sent as literal data.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self.operation, Operation::Literal(_))
    }
}
