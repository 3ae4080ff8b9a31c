use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::bits::BitCursor;
use crate::framing::RawFrame;
use crate::messages::{self, DecodedMessage, Fields, MessageDescriptor};
use crate::prelude::*;

/// Decodes the payload of a single message type.
///
/// Receives the type code being dispatched and a cursor positioned at the start of the
/// payload, i.e., at the type code itself.
pub type DecodeFn = fn(u16, &mut BitCursor<'_>) -> Result<DecodedMessage>;

/// How a registered message type is decoded.
#[derive(Clone, Copy)]
pub enum Strategy {
    /// Custom decode function.
    Decoder(DecodeFn),
    /// Generic fixed-layout decode to a [Record](crate::messages::Record).
    Layout(&'static MessageDescriptor),
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Decoder(_) => f.write_str("Decoder(..)"),
            Strategy::Layout(desc) => f.debug_tuple("Layout").field(&desc.name).finish(),
        }
    }
}

impl Strategy {
    fn decode(&self, type_code: u16, payload: &[u8]) -> Result<DecodedMessage> {
        let mut cursor = BitCursor::new(payload);
        match self {
            Strategy::Decoder(decode) => decode(type_code, &mut cursor),
            Strategy::Layout(desc) => {
                let mut fields = Fields::new(&mut cursor, type_code);
                Ok(DecodedMessage::Record(desc.decode(&mut fields)?))
            }
        }
    }
}

/// Maps message type codes to their decoders.
///
/// The table is built explicitly and owned by the caller; there is no global
/// registration. [Registry::default] contains every built-in message type and
/// further types may be added, or built-in types replaced, before decoding.
///
/// Type codes without an entry are not an error: they dispatch to
/// [DecodedMessage::Unknown] carrying the raw payload.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: BTreeMap<u16, Strategy>,
}

impl Registry {
    /// Create a registry containing exactly `entries`. Later entries for the same type
    /// code replace earlier ones.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u16, Strategy)>,
    {
        Registry {
            entries: entries.into_iter().collect(),
        }
    }

    /// A registry with no entries; every message dispatches as unknown.
    #[must_use]
    pub fn empty() -> Self {
        Registry {
            entries: BTreeMap::new(),
        }
    }

    /// Register a decode function for `type_code`, replacing any existing entry.
    #[must_use]
    pub fn register(mut self, type_code: u16, decode: DecodeFn) -> Self {
        self.entries.insert(type_code, Strategy::Decoder(decode));
        self
    }

    /// Register a fixed layout for `type_code`, replacing any existing entry.
    #[must_use]
    pub fn register_layout(mut self, type_code: u16, desc: &'static MessageDescriptor) -> Self {
        self.entries.insert(type_code, Strategy::Layout(desc));
        self
    }

    #[must_use]
    pub fn contains(&self, type_code: u16) -> bool {
        self.entries.contains_key(&type_code)
    }

    #[must_use]
    pub fn get(&self, type_code: u16) -> Option<&Strategy> {
        self.entries.get(&type_code)
    }

    /// Registered type codes in ascending order.
    pub fn type_codes(&self) -> impl Iterator<Item = u16> + '_ {
        self.entries.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode a frame's payload.
    ///
    /// # Errors
    /// * [Error::ChecksumMismatch] if the frame did not pass its CRC.
    /// * [Error::Field] or [Error::Bounds] if the payload is too short for its type.
    pub fn dispatch(&self, frame: &RawFrame) -> Result<DecodedMessage> {
        if !frame.checksum_valid {
            return Err(Error::ChecksumMismatch {
                type_code: frame.type_code,
            });
        }
        self.decode_payload(frame.type_code, &frame.payload)
    }

    /// Decode a payload as message `type_code`, without any frame checks.
    ///
    /// # Errors
    /// [Error::Field] or [Error::Bounds] if the payload is too short for its type.
    pub fn decode_payload(&self, type_code: u16, payload: &[u8]) -> Result<DecodedMessage> {
        let Some(strategy) = self.entries.get(&type_code) else {
            debug!(type_code, len = payload.len(), "no decoder registered");
            return Ok(DecodedMessage::Unknown {
                type_code,
                raw_payload: payload.to_vec(),
            });
        };
        strategy.decode(type_code, payload).inspect_err(|err| {
            debug!(type_code, "decode failed: {err}");
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(messages::builtin())
    }
}
