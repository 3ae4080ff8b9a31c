use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use super::{FrameExtractor, RawFrame, Stats};
use crate::prelude::*;

/// Iterates over the validated frames in a byte stream.
///
/// Bytes are read from the underlying reader in chunks and fed to a [FrameExtractor].
/// A read blocks only while the reader waits for its transport.
///
/// ## Errors
/// Read timeouts (`TimedOut`, `WouldBlock`) are produced as `Err` items and iteration
/// may continue once the transport recovers. Any other read error is produced once and
/// then ends iteration. End of stream ends iteration, discarding any partial frame.
///
/// ## Shutdown
/// A shutdown flag set with [with_shutdown](Self::with_shutdown) is checked before every
/// read. Once it is set, frames already buffered are still produced, any partially
/// received frame is dropped, and iteration ends.
pub struct FrameReader<R>
where
    R: Read,
{
    reader: R,
    extractor: FrameExtractor,
    chunk: Vec<u8>,
    shutdown: Option<Arc<AtomicBool>>,
    done: bool,
}

impl<R> FrameReader<R>
where
    R: Read,
{
    const DEFAULT_CHUNK_SIZE: usize = 4096;

    pub fn new(reader: R) -> Self {
        FrameReader {
            reader,
            extractor: FrameExtractor::new(),
            chunk: vec![0u8; Self::DEFAULT_CHUNK_SIZE],
            shutdown: None,
            done: false,
        }
    }

    /// Maximum number of bytes requested from the reader at once.
    ///
    /// # Panics
    /// If `size` is 0.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        assert!(size > 0, "chunk size must be non-zero");
        self.chunk = vec![0u8; size];
        self
    }

    /// Stop reading once `flag` is set.
    #[must_use]
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        self.extractor.stats()
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

impl<R> Iterator for FrameReader<R>
where
    R: Read,
{
    type Item = Result<RawFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(frame) = self.extractor.next_frame() {
                return Some(Ok(frame));
            }
            if self.done {
                return None;
            }
            if self.shutdown_requested() {
                debug!(
                    offset = self.extractor.offset(),
                    pending = self.extractor.pending_len(),
                    "shutdown requested; dropping partial frame"
                );
                self.extractor.clear();
                self.done = true;
                return None;
            }

            match self.reader.read(&mut self.chunk) {
                Ok(0) => {
                    self.extractor.finish();
                    self.done = true;
                }
                Ok(num) => self.extractor.push(&self.chunk[..num]),
                Err(err) if err.kind() == ErrorKind::Interrupted => (),
                Err(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Some(Err(Error::Io(err)));
                }
                Err(err) => {
                    debug!("read failed; ending frame iteration: {err}");
                    self.extractor.clear();
                    self.done = true;
                    return Some(Err(Error::Io(err)));
                }
            }
        }
    }
}

/// Creates an iterator that produces the CRC-validated frames in `reader`.
///
/// Non-frame bytes and frames that fail their CRC are skipped. For more control, e.g.,
/// shutdown or access to extraction statistics, see [FrameReader].
///
/// # Errors
/// Read errors are produced as `Err` items, see [FrameReader].
pub fn read_frames<'a, R>(reader: R) -> impl Iterator<Item = Result<RawFrame>> + 'a
where
    R: Read + 'a,
{
    FrameReader::new(reader)
}
