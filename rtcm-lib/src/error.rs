use crate::bits::BoundsError;

/// A field read ran past the end of a message payload.
///
/// Fatal for the message being decoded only; the frame extractor has already
/// moved past the frame so the next frame decodes normally.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("message {type_code}: field `{field}`{}: {source}", block_suffix(.block))]
pub struct FieldDecodeError {
    /// Type code of the message being decoded.
    pub type_code: u16,
    /// Name of the field or decode step that failed.
    pub field: &'static str,
    /// Index of the repeated block the field belongs to, if any.
    pub block: Option<usize>,
    #[source]
    pub source: BoundsError,
}

fn block_suffix(block: &Option<usize>) -> String {
    block.map(|b| format!("[{b}]")).unwrap_or_default()
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Bounds(#[from] BoundsError),

    #[error(transparent)]
    Field(#[from] FieldDecodeError),

    /// Dispatch was asked to decode a frame that failed its integrity check.
    #[error("checksum mismatch for message {type_code}")]
    ChecksumMismatch { type_code: u16 },

    #[error("payload of {len} bytes exceeds maximum frame payload of {max}")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("failed to start decode pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
