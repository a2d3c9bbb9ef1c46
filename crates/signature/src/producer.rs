//! crates/signature/src/producer.rs
//!
//! Channel-delivered checksum production.

use std::io::{self, Read};
use std::ops::ControlFlow;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, bounded};
use tracing::warn;

use crate::block::BlockChecksum;
use crate::error::ChecksumError;
use crate::generation::for_each_block;
use crate::options::ChecksumOptions;

/// Checksums streamed from a background producer thread.
///
/// Iterating drains the channel until the producer finishes. A read failure
/// on the basis is delivered as a final entry carrying
/// [`ChecksumError::Read`] rather than being raised, so the consumer can keep
/// whatever was produced before it.
#[derive(Debug)]
pub struct ChecksumProducer {
    receiver: Receiver<BlockChecksum>,
    handle: JoinHandle<()>,
}

impl ChecksumProducer {
    /// Returns the receiving end of the channel.
    #[must_use]
    pub fn receiver(&self) -> &Receiver<BlockChecksum> {
        &self.receiver
    }

    /// Splits the producer into its receiver and thread handle.
    #[must_use]
    pub fn into_parts(self) -> (Receiver<BlockChecksum>, JoinHandle<()>) {
        (self.receiver, self.handle)
    }

    /// Waits for the producer thread to exit.
    ///
    /// Remaining entries are discarded first so a producer blocked on a full
    /// channel can finish.
    pub fn join(self) -> thread::Result<()> {
        drop(self.receiver);
        self.handle.join()
    }
}

impl IntoIterator for ChecksumProducer {
    type Item = BlockChecksum;
    type IntoIter = crossbeam_channel::IntoIter<BlockChecksum>;

    fn into_iter(self) -> Self::IntoIter {
        self.receiver.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChecksumProducer {
    type Item = BlockChecksum;
    type IntoIter = crossbeam_channel::Iter<'a, BlockChecksum>;

    fn into_iter(self) -> Self::IntoIter {
        self.receiver.iter()
    }
}

/// Starts producing checksums for `reader` on a dedicated thread.
///
/// At most `capacity` entries are buffered; the producer blocks once the
/// channel is full. A capacity of zero makes every hand-off a rendezvous.
///
/// # Errors
///
/// Returns an error when the thread cannot be spawned.
pub fn spawn_checksum_producer<R>(
    reader: R,
    options: ChecksumOptions,
    capacity: usize,
) -> io::Result<ChecksumProducer>
where
    R: Read + Send + 'static,
{
    let (sender, receiver) = bounded(capacity);

    let handle = thread::Builder::new()
        .name("checksum-producer".to_owned())
        .spawn(move || {
            let result = for_each_block(reader, &options, |block| {
                if sender.send(block).is_ok() {
                    ControlFlow::Continue(())
                } else {
                    ControlFlow::Break(())
                }
            });

            if let Err((index, err)) = result {
                warn!(index, error = %err, "basis read failed, ending checksum stream");
                let entry =
                    BlockChecksum::failed(index, 0, Vec::new(), ChecksumError::read(index, &err));
                let _ = sender.send(entry);
            }
        })?;

    Ok(ChecksumProducer { receiver, handle })
}
