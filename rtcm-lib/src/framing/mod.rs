//! RTCM 3 transport-layer framing.
//!
//! Every message travels in a frame of the form:
//!
//! ```text
//! +----------+-------------+----------+-----------------+-----------+
//! | preamble | 6b reserved | 10b len  | payload (len B) | CRC-24Q   |
//! | 0xD3     |             |          |                 | 3 bytes   |
//! +----------+-------------+----------+-----------------+-----------+
//! ```
//!
//! The CRC covers the preamble, the length bytes and the payload. The first 12 bits
//! of the payload are the message type code.
mod extractor;
mod reader;

pub use extractor::*;
pub use reader::*;

use crate::bits::BitCursor;
use crate::prelude::*;
use crc::{Crc, CRC_24_LTE_A};

/// Frame start marker.
pub const PREAMBLE: u8 = 0xd3;
/// Preamble plus the two length bytes.
pub const HEADER_LEN: usize = 3;
/// Length of the trailing CRC-24Q.
pub const CRC_LEN: usize = 3;
/// Largest payload expressible by the 10-bit length field.
pub const MAX_PAYLOAD_LEN: usize = 0x3ff;

/// CRC-24Q as used by RTCM 3 (polynomial 0x864CFB, zero init, no reflection). The
/// catalog names the same parameters CRC-24/LTE-A.
const CRC24Q: Crc<u32> = Crc::<u32>::new(&CRC_24_LTE_A);

/// Compute the CRC-24Q of `dat`.
#[must_use]
pub fn crc24q(dat: &[u8]) -> u32 {
    CRC24Q.checksum(dat)
}

/// Wrap an already encoded message payload in a complete frame.
///
/// # Errors
/// [Error::PayloadTooLarge] if `payload` does not fit the 10-bit length field.
pub fn frame(payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(Error::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len() + CRC_LEN);
    #[allow(clippy::cast_possible_truncation)]
    let len = payload.len() as u16;
    out.push(PREAMBLE);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(payload);
    let crc = crc24q(&out);
    out.extend_from_slice(&crc.to_be_bytes()[1..]);
    Ok(out)
}

/// Read the 12-bit message type code from the start of a payload.
///
/// Payloads shorter than 12 bits have no type code and report 0.
#[must_use]
pub fn type_code(payload: &[u8]) -> u16 {
    #[allow(clippy::cast_possible_truncation)]
    BitCursor::new(payload)
        .read_uint(12)
        .map_or(0, |code| code as u16)
}

/// A single frame located in a stream.
///
/// Only produced by the extractor for frames that passed their CRC, but may be
/// constructed by hand, e.g., for payloads obtained some other way.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawFrame {
    /// Message type code, the first 12 bits of the payload.
    pub type_code: u16,
    /// Message payload, without framing bytes.
    #[cfg_attr(feature = "serde", serde(with = "serde_bytes"))]
    pub payload: Vec<u8>,
    /// Payload length from the frame's length field.
    pub declared_length: u16,
    pub checksum_valid: bool,
    /// Stream offset of the preamble byte.
    pub offset: usize,
}

impl RawFrame {
    /// Construct a frame around a payload that is known to be intact.
    ///
    /// # Errors
    /// [Error::PayloadTooLarge] if `payload` does not fit the 10-bit length field.
    pub fn from_payload(payload: Vec<u8>) -> Result<Self> {
        let declared_length =
            u16::try_from(payload.len())
                .ok()
                .filter(|len| usize::from(*len) <= MAX_PAYLOAD_LEN)
                .ok_or(Error::PayloadTooLarge {
                    len: payload.len(),
                    max: MAX_PAYLOAD_LEN,
                })?;
        Ok(RawFrame {
            type_code: type_code(&payload),
            payload,
            declared_length,
            checksum_valid: true,
            offset: 0,
        })
    }

    /// Total frame length on the wire, including preamble, length and CRC.
    #[must_use]
    pub fn wire_len(&self) -> usize {
        HEADER_LEN + self.payload.len() + CRC_LEN
    }

    /// Re-create the wire bytes for this frame.
    ///
    /// # Errors
    /// [Error::PayloadTooLarge] if the payload does not fit the 10-bit length field.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        frame(&self.payload)
    }
}
