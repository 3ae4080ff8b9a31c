use super::{Decode, Fields};
use crate::FieldDecodeError;

/// 1033, receiver and antenna descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Msg1033 {
    pub message_number: u16,
    pub reference_station_id: u16,
    pub antenna_descriptor: String,
    pub antenna_setup_id: u8,
    pub antenna_serial_number: String,
    pub receiver_type: String,
    pub receiver_firmware_version: String,
    pub receiver_serial_number: String,
}

impl Msg1033 {
    pub const TYPE_CODE: u16 = 1033;
}

impl Decode for Msg1033 {
    #[allow(clippy::cast_possible_truncation)]
    fn decode(fields: &mut Fields<'_, '_>) -> Result<Self, FieldDecodeError> {
        Ok(Msg1033 {
            message_number: fields.uint("message_number", 12)? as u16,
            reference_station_id: fields.uint("reference_station_id", 12)? as u16,
            antenna_descriptor: fields.string("antenna_descriptor")?,
            antenna_setup_id: fields.uint("antenna_setup_id", 8)? as u8,
            antenna_serial_number: fields.string("antenna_serial_number")?,
            receiver_type: fields.string("receiver_type")?,
            receiver_firmware_version: fields.string("receiver_firmware_version")?,
            receiver_serial_number: fields.string("receiver_serial_number")?,
        })
    }
}
