#![doc = include_str!("../README.md")]

mod error;

pub mod bits;
pub mod decoder;
pub mod framing;
pub mod messages;
pub mod registry;

pub use bits::{BitCursor, BoundsError};
pub use decoder::{DecodedFrame, MessageDecoder};
pub use error::{Error, FieldDecodeError, Result};
pub use framing::{read_frames, FrameExtractor, FrameReader, RawFrame};
pub use messages::DecodedMessage;
pub use registry::Registry;

pub(crate) mod prelude {
    pub use crate::error::{Error, Result};
}
