use super::{Decode, Fields};
use crate::FieldDecodeError;

fixed_layout! {
    /// Fixed part of a 1013 system parameters message.
    pub struct SystemParametersHeader {
        pub message_number: u16 = u(12),
        pub reference_station_id: u16 = u(12),
        /// Modified Julian Day number.
        pub mjd: u16 = u(16),
        pub seconds_of_day: u32 = u(17),
        pub message_count: u8 = u(5),
        pub leap_seconds: u8 = u(8),
    }
}

fixed_layout! {
    /// Transmission schedule for one message type.
    pub struct ScheduledMessage {
        pub message_id: u16 = u(12),
        pub sync: bool = b(1),
        /// In units of 0.1 s.
        pub transmission_interval: u16 = u(16),
    }
}

/// 1013, system parameters: the messages a station transmits and how often.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Msg1013 {
    pub message_number: u16,
    pub reference_station_id: u16,
    pub mjd: u16,
    pub seconds_of_day: u32,
    pub leap_seconds: u8,
    /// One entry per announced message, `message_count` in total.
    pub messages: Vec<ScheduledMessage>,
}

impl Msg1013 {
    pub const TYPE_CODE: u16 = 1013;
}

impl Decode for Msg1013 {
    fn decode(fields: &mut Fields<'_, '_>) -> Result<Self, FieldDecodeError> {
        let header = SystemParametersHeader::decode(fields)?;
        let mut messages = Vec::with_capacity(usize::from(header.message_count));
        for idx in 0..usize::from(header.message_count) {
            fields.set_block(Some(idx));
            messages.push(ScheduledMessage::decode(fields)?);
        }
        fields.set_block(None);

        Ok(Msg1013 {
            message_number: header.message_number,
            reference_station_id: header.reference_station_id,
            mjd: header.mjd,
            seconds_of_day: header.seconds_of_day,
            leap_seconds: header.leap_seconds,
            messages,
        })
    }
}
