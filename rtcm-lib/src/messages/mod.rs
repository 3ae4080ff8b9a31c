//! Message types and their decoders.
//!
//! Fixed-layout messages are declared with `fixed_layout!`, which produces both the
//! typed struct and its [MessageDescriptor] from a single field list, so the wire
//! layout and the decoded fields cannot drift apart.
//!
//! References:
//! * RTCM Standard 10403.3, Differential GNSS Services - Version 3

/// Declare a fixed-layout record.
///
/// Each field is `pub name: Type = kind(width)` where kind is `u` (unsigned), `s`
/// (two's-complement signed) or `b` (unsigned, non-zero is `true`). Fields are decoded
/// in declaration order.
macro_rules! fixed_layout {
    (@signed u) => { false };
    (@signed s) => { true };
    (@signed b) => { false };
    (@read $fields:ident, u, $name:expr, $width:literal) => { $fields.uint($name, $width)? };
    (@read $fields:ident, s, $name:expr, $width:literal) => { $fields.int($name, $width)? };
    (@read $fields:ident, b, $name:expr, $width:literal) => { $fields.uint($name, $width)? != 0 };
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                pub $field:ident: $ty:ty = $kind:ident($width:literal),
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize))]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty, )+
        }

        impl $name {
            /// Field layout in wire order.
            pub const DESCRIPTOR: $crate::messages::MessageDescriptor =
                $crate::messages::MessageDescriptor::new(stringify!($name), &[
                    $(
                        $crate::messages::FieldSpec {
                            name: stringify!($field),
                            signed: fixed_layout!(@signed $kind),
                            width: $width,
                        },
                    )+
                ]);
        }

        impl $crate::messages::Decode for $name {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_possible_wrap,
                clippy::cast_sign_loss,
                clippy::unnecessary_cast
            )]
            fn decode(
                fields: &mut $crate::messages::Fields<'_, '_>,
            ) -> ::std::result::Result<Self, $crate::FieldDecodeError> {
                Ok($name {
                    $( $field: fixed_layout!(@read fields, $kind, stringify!($field), $width) as $ty, )+
                })
            }
        }
    };
}

mod descriptor;
mod ephemeris;
mod msm;
mod station;
mod system;

pub use descriptor::*;
pub use ephemeris::*;
pub use msm::*;
pub use station::*;
pub use system::*;

use crate::bits::BitCursor;
use crate::prelude::*;
use crate::registry::Strategy;
use crate::FieldDecodeError;

/// One field of a fixed layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Two's-complement signed when true.
    pub signed: bool,
    /// Width in bits, 1 to 64.
    pub width: u8,
}

impl FieldSpec {
    #[must_use]
    pub const fn unsigned(name: &'static str, width: u8) -> Self {
        FieldSpec {
            name,
            signed: false,
            width,
        }
    }

    #[must_use]
    pub const fn signed(name: &'static str, width: u8) -> Self {
        FieldSpec {
            name,
            signed: true,
            width,
        }
    }
}

/// Static schema for a message, or message sub-block, whose field widths are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDescriptor {
    pub name: &'static str,
    /// Fields in wire order.
    pub fields: &'static [FieldSpec],
}

impl MessageDescriptor {
    #[must_use]
    pub const fn new(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        MessageDescriptor { name, fields }
    }

    /// Total width of all fields in bits.
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.fields.iter().map(|f| usize::from(f.width)).sum()
    }

    /// Decode every field in order into a [Record].
    ///
    /// Bits after the last field are left unread.
    ///
    /// # Errors
    /// [FieldDecodeError] for the first field that runs past the end of the payload.
    pub fn decode(&self, fields: &mut Fields<'_, '_>) -> std::result::Result<Record, FieldDecodeError> {
        let mut values = Vec::with_capacity(self.fields.len());
        for spec in self.fields {
            let value = if spec.signed {
                Value::Signed(fields.int(spec.name, spec.width)?)
            } else {
                Value::Unsigned(fields.uint(spec.name, spec.width)?)
            };
            values.push(Field {
                name: spec.name,
                value,
            });
        }
        Ok(Record {
            type_code: fields.type_code(),
            name: self.name,
            fields: values,
        })
    }
}

/// A decoded field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Value {
    Unsigned(u64),
    Signed(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Field {
    pub name: &'static str,
    pub value: Value,
}

/// A message decoded from a [MessageDescriptor] alone, with no dedicated type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Record {
    pub type_code: u16,
    /// Descriptor name.
    pub name: &'static str,
    /// Fields in wire order.
    pub fields: Vec<Field>,
}

impl Record {
    /// Value of the first field called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.value)
    }
}

/// Reads named fields for one message, attributing bounds failures to the field and
/// repeated block being read.
pub struct Fields<'c, 'a> {
    cursor: &'c mut BitCursor<'a>,
    type_code: u16,
    block: Option<usize>,
}

impl<'c, 'a> Fields<'c, 'a> {
    pub fn new(cursor: &'c mut BitCursor<'a>, type_code: u16) -> Self {
        Fields {
            cursor,
            type_code,
            block: None,
        }
    }

    #[must_use]
    pub fn type_code(&self) -> u16 {
        self.type_code
    }

    /// Bit position of the underlying cursor.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Set the repeated-block index reported by subsequent failures.
    pub fn set_block(&mut self, block: Option<usize>) {
        self.block = block;
    }

    fn err(&self, field: &'static str, source: crate::bits::BoundsError) -> FieldDecodeError {
        FieldDecodeError {
            type_code: self.type_code,
            field,
            block: self.block,
            source,
        }
    }

    /// # Errors
    /// [FieldDecodeError] if the field runs past the payload.
    pub fn uint(&mut self, name: &'static str, width: u8) -> std::result::Result<u64, FieldDecodeError> {
        self.cursor.read_uint(width).map_err(|e| self.err(name, e))
    }

    /// # Errors
    /// [FieldDecodeError] if the field runs past the payload.
    pub fn int(&mut self, name: &'static str, width: u8) -> std::result::Result<i64, FieldDecodeError> {
        self.cursor.read_int(width).map_err(|e| self.err(name, e))
    }

    /// # Errors
    /// [FieldDecodeError] if the field runs past the payload.
    pub fn flag(&mut self, name: &'static str) -> std::result::Result<bool, FieldDecodeError> {
        self.cursor.read_flag().map_err(|e| self.err(name, e))
    }

    /// # Errors
    /// [FieldDecodeError] if the field runs past the payload.
    pub fn bytes(&mut self, name: &'static str, count: usize) -> std::result::Result<Vec<u8>, FieldDecodeError> {
        self.cursor.read_bytes(count).map_err(|e| self.err(name, e))
    }

    /// A counted character string: an 8-bit length followed by that many bytes.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Errors
    /// [FieldDecodeError] if the count or the string runs past the payload.
    pub fn string(&mut self, name: &'static str) -> std::result::Result<String, FieldDecodeError> {
        let count = self.uint(name, 8)?;
        let dat = self.bytes(name, usize::try_from(count).unwrap_or(usize::MAX))?;
        Ok(String::from_utf8_lossy(&dat).into_owned())
    }
}

/// Types decoded from a sequence of named fields.
pub trait Decode: Sized {
    /// Decode from the current position of `fields`.
    ///
    /// # Errors
    /// [FieldDecodeError] for the first field that runs past the payload.
    fn decode(fields: &mut Fields<'_, '_>) -> std::result::Result<Self, FieldDecodeError>;
}

/// Decode function suitable for registering any [Decode] message with a
/// [Registry](crate::registry::Registry).
///
/// # Errors
/// [Error::Field] if a field runs past the payload.
pub fn decode_message<M>(type_code: u16, cursor: &mut BitCursor<'_>) -> Result<DecodedMessage>
where
    M: Decode + Into<DecodedMessage>,
{
    let mut fields = Fields::new(cursor, type_code);
    Ok(M::decode(&mut fields)?.into())
}

/// A decoded message.
///
/// Every registered message type has its own variant. Types registered only by
/// descriptor decode to [Record](DecodedMessage::Record) and types without any
/// registration are carried through as [Unknown](DecodedMessage::Unknown).
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum DecodedMessage {
    StationArp(Msg1005),
    StationArpHeight(Msg1006),
    SystemParameters(Msg1013),
    GpsEphemeris(Msg1019),
    GlonassEphemeris(Msg1020),
    ReceiverDescriptors(Msg1033),
    Msm7(Msm7),
    Record(Record),
    #[from(skip)]
    Unknown {
        type_code: u16,
        #[cfg_attr(feature = "serde", serde(with = "serde_bytes"))]
        raw_payload: Vec<u8>,
    },
}

impl DecodedMessage {
    #[must_use]
    pub fn type_code(&self) -> u16 {
        match self {
            DecodedMessage::StationArp(m) => m.message_number,
            DecodedMessage::StationArpHeight(m) => m.message_number,
            DecodedMessage::SystemParameters(m) => m.message_number,
            DecodedMessage::GpsEphemeris(m) => m.message_number,
            DecodedMessage::GlonassEphemeris(m) => m.message_number,
            DecodedMessage::ReceiverDescriptors(m) => m.message_number,
            DecodedMessage::Msm7(m) => m.header.message_number,
            DecodedMessage::Record(r) => r.type_code,
            DecodedMessage::Unknown { type_code, .. } => *type_code,
        }
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, DecodedMessage::Unknown { .. })
    }
}

/// Registry entries for every built-in message type.
pub(crate) fn builtin() -> Vec<(u16, Strategy)> {
    let mut entries: Vec<(u16, Strategy)> = vec![
        (Msg1005::TYPE_CODE, Strategy::Decoder(decode_message::<Msg1005>)),
        (Msg1006::TYPE_CODE, Strategy::Decoder(decode_message::<Msg1006>)),
        (Msg1013::TYPE_CODE, Strategy::Decoder(decode_message::<Msg1013>)),
        (Msg1019::TYPE_CODE, Strategy::Decoder(decode_message::<Msg1019>)),
        (Msg1020::TYPE_CODE, Strategy::Decoder(decode_message::<Msg1020>)),
        (Msg1033::TYPE_CODE, Strategy::Decoder(decode_message::<Msg1033>)),
    ];
    entries.extend(
        Constellation::ALL
            .iter()
            .map(|c| (c.msm7_type_code(), Strategy::Decoder(decode_message::<Msm7>))),
    );
    entries
}
