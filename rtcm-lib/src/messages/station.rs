//! Stationary reference station antenna reference point messages.

fixed_layout! {
    /// 1005, stationary antenna reference point (ARP) without height.
    ///
    /// ECEF coordinates are in units of 0.0001 m.
    pub struct Msg1005 {
        pub message_number: u16 = u(12),
        pub reference_station_id: u16 = u(12),
        pub itrf_year: u8 = u(6),
        pub gps_indicator: bool = b(1),
        pub glonass_indicator: bool = b(1),
        pub galileo_indicator: bool = b(1),
        pub reference_station_indicator: bool = b(1),
        pub ecef_x: i64 = s(38),
        pub oscillator_indicator: bool = b(1),
        pub reserved: u8 = u(1),
        pub ecef_y: i64 = s(38),
        pub quarter_cycle_indicator: u8 = u(2),
        pub ecef_z: i64 = s(38),
    }
}

fixed_layout! {
    /// 1006, stationary antenna reference point with antenna height.
    ///
    /// ECEF coordinates and antenna height are in units of 0.0001 m.
    pub struct Msg1006 {
        pub message_number: u16 = u(12),
        pub reference_station_id: u16 = u(12),
        pub itrf_year: u8 = u(6),
        pub gps_indicator: bool = b(1),
        pub glonass_indicator: bool = b(1),
        pub galileo_indicator: bool = b(1),
        pub reference_station_indicator: bool = b(1),
        pub ecef_x: i64 = s(38),
        pub oscillator_indicator: bool = b(1),
        pub reserved: u8 = u(1),
        pub ecef_y: i64 = s(38),
        pub quarter_cycle_indicator: u8 = u(2),
        pub ecef_z: i64 = s(38),
        pub antenna_height: u16 = u(16),
    }
}

impl Msg1005 {
    pub const TYPE_CODE: u16 = 1005;
}

impl Msg1006 {
    pub const TYPE_CODE: u16 = 1006;
}
