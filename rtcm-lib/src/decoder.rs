use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, Receiver};
use tracing::{debug, span, Level};
use typed_builder::TypedBuilder;

use crate::framing::RawFrame;
use crate::messages::DecodedMessage;
use crate::prelude::*;
use crate::registry::Registry;

/// The result of decoding a single frame.
#[derive(Debug)]
pub struct DecodedFrame {
    /// Stream offset of the frame's preamble.
    pub offset: usize,
    pub type_code: u16,
    /// The decoded message. Decode failures only affect this frame.
    pub message: Result<DecodedMessage>,
}

/// Decodes frames on a thread pool.
///
/// Frames are consumed on a background thread and each is decoded as a separate pool
/// job. Results are produced in the order the frames were received regardless of which
/// job finishes first.
///
/// # Example
/// ```
/// use rtcm3::framing::{frame, read_frames};
/// use rtcm3::MessageDecoder;
///
/// let stream = frame(&[0xff, 0xf0]).unwrap();
/// let decoded: Vec<_> = MessageDecoder::builder()
///     .num_threads(2)
///     .build()
///     .decode(read_frames(std::io::Cursor::new(stream)).filter_map(Result::ok))
///     .unwrap()
///     .collect();
/// assert_eq!(decoded[0].type_code, 4095);
/// ```
#[derive(TypedBuilder)]
pub struct MessageDecoder {
    /// Registry used to dispatch frames. Defaults to all built-in message types.
    #[builder(default)]
    registry: Registry,
    /// Number of decode threads. The default of 0 lets the pool decide.
    #[builder(default)]
    num_threads: usize,
}

impl MessageDecoder {
    const DEFAULT_BUFFER_SIZE: usize = 1024;

    /// Start decoding `frames` in the background and return an iterator over the
    /// results.
    ///
    /// # Errors
    /// If the decode thread or its pool cannot be started.
    pub fn decode<F>(self, frames: F) -> Result<DecodedFrameIter>
    where
        F: IntoIterator<Item = RawFrame>,
        F::IntoIter: Send + 'static,
    {
        let frames = frames.into_iter();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .thread_name(|idx| format!("rtcm3_decode_{idx}"))
            .build()?;
        let registry = Arc::new(self.registry);
        let (jobs_tx, jobs_rx) = bounded(Self::DEFAULT_BUFFER_SIZE);

        let handle = thread::Builder::new()
            .name("rtcm3_decoder".into())
            .spawn(move || {
                for frame in frames {
                    let (future_tx, future_rx) = bounded(1);
                    let registry = registry.clone();

                    // spawn_fifo keeps jobs in arrival order
                    pool.spawn_fifo(move || {
                        let span = span!(
                            Level::TRACE,
                            "frame",
                            type_code = frame.type_code,
                            offset = frame.offset
                        );
                        let _guard = span.enter();

                        let decoded = DecodedFrame {
                            offset: frame.offset,
                            type_code: frame.type_code,
                            message: registry.dispatch(&frame),
                        };
                        if future_tx.send(decoded).is_err() {
                            debug!(offset = frame.offset, "failed to send decoded frame");
                        }
                    });

                    if jobs_tx.send(future_rx).is_err() {
                        debug!("decoded frame receiver dropped; stopping");
                        break;
                    }
                }
            })?;

        Ok(DecodedFrameIter {
            jobs: jobs_rx,
            handle: Some(handle),
        })
    }
}

/// Produces [DecodedFrame]s in stream order. See [MessageDecoder::decode].
pub struct DecodedFrameIter {
    jobs: Receiver<Receiver<DecodedFrame>>,
    handle: Option<JoinHandle<()>>,
}

impl Iterator for DecodedFrameIter {
    type Item = DecodedFrame;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // blocks until the next frame is submitted or all frames have been
            let Ok(rx) = self.jobs.recv() else {
                if let Some(handle) = self.handle.take() {
                    if handle.join().is_err() {
                        debug!("decoder thread panicked");
                    }
                }
                return None;
            };
            match rx.recv() {
                Ok(decoded) => return Some(decoded),
                Err(_) => debug!("decode job ended without a result"),
            }
        }
    }
}
