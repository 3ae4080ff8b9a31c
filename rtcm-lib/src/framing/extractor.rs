use tracing::trace;

use super::{crc24q, type_code, RawFrame, CRC_LEN, HEADER_LEN, PREAMBLE};

/// Where the extractor is in locating the next frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum State {
    /// Looking for a preamble byte.
    #[default]
    Seeking,
    /// A preamble was found; waiting for the length bytes.
    HaveCandidate,
    /// Length is known; waiting for payload and CRC before checking.
    Validating { length: u16 },
}

/// Running counters for an extractor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    /// Frames emitted.
    pub frames: usize,
    /// Preamble candidates rejected by their CRC.
    pub resyncs: usize,
    /// Bytes not belonging to any emitted frame.
    pub skipped: usize,
}

/// Locates CRC-validated frames in a byte stream.
///
/// The extractor does no I/O. Bytes are handed to it with [push](Self::push) as they
/// arrive and frames are drained with [next_frame](Self::next_frame), which returns
/// `None` when more bytes are required to make progress. A partially received frame
/// simply waits in the buffer for the rest of its bytes.
///
/// A preamble whose frame fails the CRC is treated as a false positive: the
/// extractor moves exactly one byte past it and resumes scanning, so a genuine frame
/// starting anywhere after a stray `0xD3` is still found.
///
/// # Example
/// ```
/// use rtcm3::framing::{frame, FrameExtractor};
///
/// let mut extractor = FrameExtractor::new();
/// extractor.push(&[0x00, 0xd3]); // noise, then a stray preamble
/// extractor.push(&frame(&[0x06, 0x40, 0x00, 0x00, 0x28]).unwrap());
/// extractor.finish();
///
/// let frame = extractor.next_frame().unwrap();
/// assert_eq!(frame.type_code, 100);
/// assert!(extractor.next_frame().is_none());
/// ```
#[derive(Debug, Default)]
pub struct FrameExtractor {
    buf: Vec<u8>,
    // Index into buf of the first unconsumed byte
    start: usize,
    // Stream offset of buf[0]
    base: usize,
    state: State,
    eof: bool,
    stats: Stats,
}

impl FrameExtractor {
    // Compact the buffer once this many consumed bytes have accumulated.
    const COMPACT_THRESHOLD: usize = 8192;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append newly received stream bytes.
    pub fn push(&mut self, dat: &[u8]) {
        if self.start >= Self::COMPACT_THRESHOLD {
            self.buf.drain(..self.start);
            self.base += self.start;
            self.start = 0;
        }
        self.buf.extend_from_slice(dat);
    }

    /// Signal that no more bytes will be pushed.
    ///
    /// An incomplete candidate can then never validate, so it is rejected like a
    /// CRC failure and scanning continues after its preamble. Whatever cannot form a
    /// frame is discarded once [next_frame](Self::next_frame) returns `None`.
    pub fn finish(&mut self) {
        self.eof = true;
    }

    /// Drop any buffered bytes, including a partially received frame, and return to
    /// [State::Seeking].
    pub fn clear(&mut self) {
        self.stats.skipped += self.pending_len();
        self.base += self.buf.len();
        self.buf.clear();
        self.start = 0;
        self.state = State::Seeking;
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Number of buffered bytes not yet consumed.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.buf.len() - self.start
    }

    /// Stream offset of the next unconsumed byte.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.base + self.start
    }

    fn pending(&self) -> &[u8] {
        &self.buf[self.start..]
    }

    fn consume(&mut self, num: usize) {
        self.start += num;
    }

    // Reject the current candidate and move one byte past its preamble.
    fn resync(&mut self) {
        self.stats.resyncs += 1;
        self.stats.skipped += 1;
        self.consume(1);
        self.state = State::Seeking;
    }

    /// Advance the state machine as far as the buffered bytes allow.
    ///
    /// Returns the next validated frame, or `None` if more bytes are needed.
    pub fn next_frame(&mut self) -> Option<RawFrame> {
        loop {
            match self.state {
                State::Seeking => {
                    let pending = self.pending();
                    match pending.iter().position(|b| *b == PREAMBLE) {
                        Some(idx) => {
                            self.stats.skipped += idx;
                            self.consume(idx);
                            self.state = State::HaveCandidate;
                        }
                        None => {
                            let num = pending.len();
                            self.stats.skipped += num;
                            self.consume(num);
                            return None;
                        }
                    }
                }
                State::HaveCandidate => {
                    let pending = self.pending();
                    if pending.len() < HEADER_LEN {
                        if self.eof {
                            trace!(offset = self.offset(), "stream ended inside frame header");
                            self.resync();
                            continue;
                        }
                        return None;
                    }
                    if pending[1] & 0xfc != 0 {
                        trace!(offset = self.offset(), "reserved length bits set");
                    }
                    let length = u16::from_be_bytes([pending[1] & 0x03, pending[2]]);
                    self.state = State::Validating { length };
                }
                State::Validating { length } => {
                    let total = HEADER_LEN + usize::from(length) + CRC_LEN;
                    let pending = self.pending();
                    if pending.len() < total {
                        if self.eof {
                            trace!(offset = self.offset(), length, "stream ended inside frame");
                            self.resync();
                            continue;
                        }
                        return None;
                    }

                    let body = &pending[..total - CRC_LEN];
                    let expected = u32::from_be_bytes([
                        0,
                        pending[total - 3],
                        pending[total - 2],
                        pending[total - 1],
                    ]);
                    let actual = crc24q(body);
                    if actual != expected {
                        trace!(
                            offset = self.offset(),
                            length,
                            expected,
                            actual,
                            "crc mismatch; resyncing"
                        );
                        self.resync();
                        continue;
                    }

                    let payload = body[HEADER_LEN..].to_vec();
                    let frame = RawFrame {
                        type_code: type_code(&payload),
                        payload,
                        declared_length: length,
                        checksum_valid: true,
                        offset: self.offset(),
                    };
                    self.consume(total);
                    self.state = State::Seeking;
                    self.stats.frames += 1;
                    return Some(frame);
                }
            }
        }
    }
}
