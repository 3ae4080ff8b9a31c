//! Broadcast ephemeris messages.
//!
//! Values are left in the scaled integer units of the broadcast navigation message.

fixed_layout! {
    /// 1019, GPS satellite ephemeris.
    pub struct Msg1019 {
        pub message_number: u16 = u(12),
        pub satellite_id: u8 = u(6),
        pub week_number: u16 = u(10),
        pub sv_accuracy: u8 = u(4),
        pub code_on_l2: u8 = u(2),
        pub idot: i16 = s(14),
        pub iode: u8 = u(8),
        pub toc: u16 = u(16),
        pub af2: i8 = s(8),
        pub af1: i16 = s(16),
        pub af0: i32 = s(22),
        pub iodc: u16 = u(10),
        pub crs: i16 = s(16),
        pub delta_n: i16 = s(16),
        pub m0: i32 = s(32),
        pub cuc: i16 = s(16),
        pub eccentricity: u32 = u(32),
        pub cus: i16 = s(16),
        pub sqrt_a: u32 = u(32),
        pub toe: u16 = u(16),
        pub cic: i16 = s(16),
        pub omega0: i32 = s(32),
        pub cis: i16 = s(16),
        pub i0: i32 = s(32),
        pub crc: i16 = s(16),
        pub omega: i32 = s(32),
        pub omega_dot: i32 = s(24),
        pub tgd: i8 = s(8),
        pub health: u8 = u(6),
        pub l2_p_data_flag: bool = b(1),
        pub fit_interval: bool = b(1),
    }
}

fixed_layout! {
    /// 1020, GLONASS satellite ephemeris.
    ///
    /// Position, velocity and acceleration are given for each of the three PZ-90 axes.
    pub struct Msg1020 {
        pub message_number: u16 = u(12),
        pub satellite_id: u8 = u(6),
        pub frequency_channel: u8 = u(5),
        pub almanac_health: bool = b(1),
        pub almanac_health_available: bool = b(1),
        pub p1: u8 = u(2),
        pub tk: u16 = u(12),
        pub bn_msb: bool = b(1),
        pub p2: bool = b(1),
        pub tb: u8 = u(7),
        pub x_dot: i32 = s(24),
        pub x: i32 = s(27),
        pub x_dot_dot: i8 = s(5),
        pub y_dot: i32 = s(24),
        pub y: i32 = s(27),
        pub y_dot_dot: i8 = s(5),
        pub z_dot: i32 = s(24),
        pub z: i32 = s(27),
        pub z_dot_dot: i8 = s(5),
        pub p3: bool = b(1),
        pub gamma_n: i16 = s(11),
        pub mp: u8 = u(2),
        pub m_ln3: bool = b(1),
        pub tau_n: i32 = s(22),
        pub m_delta_tau_n: i8 = s(5),
        pub en: u8 = u(5),
        pub m_p4: bool = b(1),
        pub m_ft: u8 = u(4),
        pub m_nt: u16 = u(11),
        pub m_m: u8 = u(2),
        pub additional_data: bool = b(1),
        pub na: u16 = u(11),
        pub tau_c: i32 = s(32),
        pub m_n4: u8 = u(5),
        pub m_tau_gps: u32 = u(22),
        pub m_ln5: bool = b(1),
        pub reserved: u8 = u(7),
    }
}

impl Msg1019 {
    pub const TYPE_CODE: u16 = 1019;
}

impl Msg1020 {
    pub const TYPE_CODE: u16 = 1020;
}
