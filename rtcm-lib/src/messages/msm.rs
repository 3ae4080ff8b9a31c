//! Multiple Signal Messages (MSM), type 7.
//!
//! An MSM body is a fixed header followed by sections whose sizes depend on masks
//! carried in the message itself:
//!
//! ```text
//! header (73) | satellite mask (64) | signal mask (32) | cell mask (nsat * nsig)
//!   | nsat satellite blocks (36 each) | nsig signal blocks (80 each)
//! ```
//!
//! where `nsat` and `nsig` are the number of bits set in the satellite and signal
//! masks. Decoding is masks first, then counts, then one loop per block section.
use super::{Decode, Fields};
use crate::FieldDecodeError;

/// A GNSS constellation, as implied by the MSM type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Constellation {
    Gps,
    Glonass,
    Galileo,
    Sbas,
    Qzss,
    Beidou,
    Navic,
}

impl Constellation {
    pub const ALL: [Constellation; 7] = [
        Constellation::Gps,
        Constellation::Glonass,
        Constellation::Galileo,
        Constellation::Sbas,
        Constellation::Qzss,
        Constellation::Beidou,
        Constellation::Navic,
    ];

    /// Type code of the first MSM of this constellation's series, i.e., MSM1.
    fn base(self) -> u16 {
        match self {
            Constellation::Gps => 1071,
            Constellation::Glonass => 1081,
            Constellation::Galileo => 1091,
            Constellation::Sbas => 1101,
            Constellation::Qzss => 1111,
            Constellation::Beidou => 1121,
            Constellation::Navic => 1131,
        }
    }

    /// Constellation for any MSM1 through MSM7 type code.
    #[must_use]
    pub fn from_type_code(type_code: u16) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| (c.base()..c.base() + 7).contains(&type_code))
    }

    #[must_use]
    pub fn msm7_type_code(self) -> u16 {
        self.base() + 6
    }
}

fixed_layout! {
    /// Header common to all MSM types.
    pub struct MsmHeader {
        pub message_number: u16 = u(12),
        pub reference_station_id: u16 = u(12),
        /// Constellation-specific epoch time, e.g., GPS milliseconds of week.
        pub epoch_time: u32 = u(30),
        /// More messages follow for the same epoch.
        pub multiple_message: bool = b(1),
        /// Issue of data station.
        pub iods: u8 = u(3),
        pub reserved: u8 = u(7),
        pub clock_steering: u8 = u(2),
        pub external_clock: u8 = u(2),
        pub divergence_free_smoothing: bool = b(1),
        pub smoothing_interval: u8 = u(3),
    }
}

fixed_layout! {
    /// Per-satellite data of an MSM7.
    pub struct SatelliteData {
        /// Integer milliseconds of the rough range.
        pub rough_range_ms: u8 = u(8),
        pub extended_info: u8 = u(4),
        /// Rough range modulo 1 ms, in units of 2^-10 ms.
        pub rough_range_mod: u16 = u(10),
        /// Rough phase-range rate in m/s.
        pub rough_phase_range_rate: i16 = s(14),
    }
}

fixed_layout! {
    /// Per-signal data of an MSM7.
    pub struct SignalData {
        pub fine_pseudorange: i32 = s(20),
        pub fine_phase_range: i32 = s(24),
        pub lock_time: u16 = u(10),
        pub half_cycle_ambiguity: bool = b(1),
        /// Carrier to noise ratio in units of 2^-4 dB-Hz.
        pub cnr: u16 = u(10),
        pub fine_phase_range_rate: i16 = s(15),
    }
}

/// Which satellite/signal combinations carry an observation.
///
/// Stored satellite-major: the bit for satellite index `sat` and signal index `sig` is
/// bit `sat * nsig + sig`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CellMask {
    nsat: usize,
    nsig: usize,
    bits: Vec<bool>,
}

impl CellMask {
    /// Whether the cell for the `sat`-th satellite and `sig`-th signal (indices into
    /// the masks' set bits, not ids) is present.
    #[must_use]
    pub fn get(&self, sat: usize, sig: usize) -> Option<bool> {
        if sat >= self.nsat || sig >= self.nsig {
            return None;
        }
        self.bits.get(sat * self.nsig + sig).copied()
    }

    /// Total number of cells, `nsat * nsig`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of cells present.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }
}

/// An MSM7 message: full pseudorange, phase range, phase-range rate and CNR.
///
/// Satellite and signal blocks are not gated by the cell mask. There is one satellite
/// block per satellite mask bit and one signal block per signal mask bit. Use
/// [cells](Msm7::cells) to associate them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Msm7 {
    pub header: MsmHeader,
    pub satellite_mask: u64,
    pub signal_mask: u32,
    pub cell_mask: CellMask,
    /// One block per satellite id, in ascending id order.
    pub satellites: Vec<SatelliteData>,
    /// One block per signal id, in ascending id order.
    pub signals: Vec<SignalData>,
}

/// Ascending positions of the set bits in `mask`, bit 0 being the least significant.
fn set_bits(mask: u64) -> impl Iterator<Item = u8> {
    (0..64u8).filter(move |bit| mask & (1u64 << bit) != 0)
}

impl Msm7 {
    /// Bits before the satellite and signal blocks, not counting the cell mask.
    pub const HEADER_BITS: usize = 73 + 64 + 32;

    /// Constellation implied by the message type code.
    #[must_use]
    pub fn constellation(&self) -> Option<Constellation> {
        Constellation::from_type_code(self.header.message_number)
    }

    /// Satellite ids, the set bit positions of the satellite mask.
    pub fn satellite_ids(&self) -> impl Iterator<Item = u8> + '_ {
        set_bits(self.satellite_mask)
    }

    /// Signal ids, the set bit positions of the signal mask.
    pub fn signal_ids(&self) -> impl Iterator<Item = u8> + '_ {
        set_bits(u64::from(self.signal_mask))
    }

    /// Every `(satellite id, signal id, present)` combination, satellite outer and
    /// signal inner.
    pub fn cells(&self) -> impl Iterator<Item = (u8, u8, bool)> + '_ {
        self.satellite_ids()
            .enumerate()
            .flat_map(move |(sat_idx, sat)| {
                self.signal_ids().enumerate().map(move |(sig_idx, sig)| {
                    (sat, sig, self.cell_mask.get(sat_idx, sig_idx).unwrap_or(false))
                })
            })
    }

    /// Number of bits occupied by a body with the given satellite and signal counts.
    #[must_use]
    pub fn bit_len(nsat: usize, nsig: usize) -> usize {
        Self::HEADER_BITS + nsat * nsig + 36 * nsat + 80 * nsig
    }
}

impl Decode for Msm7 {
    fn decode(fields: &mut Fields<'_, '_>) -> Result<Self, FieldDecodeError> {
        let header = MsmHeader::decode(fields)?;
        let satellite_mask = fields.uint("satellite_mask", 64)?;
        #[allow(clippy::cast_possible_truncation)]
        let signal_mask = fields.uint("signal_mask", 32)? as u32;

        let nsat = satellite_mask.count_ones() as usize;
        let nsig = signal_mask.count_ones() as usize;

        let mut bits = Vec::with_capacity(nsat * nsig);
        for idx in 0..nsat * nsig {
            fields.set_block(Some(idx));
            bits.push(fields.flag("cell_mask")?);
        }

        let mut satellites = Vec::with_capacity(nsat);
        for idx in 0..nsat {
            fields.set_block(Some(idx));
            satellites.push(SatelliteData::decode(fields)?);
        }

        let mut signals = Vec::with_capacity(nsig);
        for idx in 0..nsig {
            fields.set_block(Some(idx));
            signals.push(SignalData::decode(fields)?);
        }
        fields.set_block(None);

        Ok(Msm7 {
            header,
            satellite_mask,
            signal_mask,
            cell_mask: CellMask { nsat, nsig, bits },
            satellites,
            signals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitCursor;
    use test_case::test_case;

    fn pack(fields: &[(u64, u8)]) -> Vec<u8> {
        let mut bits: Vec<bool> = Vec::default();
        for &(value, width) in fields {
            bits.extend((0..width).rev().map(|i| (value >> i) & 1 == 1));
        }
        bits.chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (i, b)| acc | (u8::from(*b) << (7 - i)))
            })
            .collect()
    }

    fn header(type_code: u16) -> Vec<(u64, u8)> {
        vec![
            (u64::from(type_code), 12),
            (7, 12),
            (345_600_000, 30),
            (1, 1),
            (5, 3),
            (0, 7),
            (1, 2),
            (2, 2),
            (0, 1),
            (3, 3),
        ]
    }

    /// Two satellites (ids 0 and 3), one signal (id 1), cell mask `10`.
    fn two_by_one() -> Vec<u8> {
        let mut fields = header(1077);
        fields.extend([(0b1001, 64), (0b10, 32), (0b10, 2)]);
        for sat in 0..2u64 {
            fields.extend([(70 + sat, 8), (0, 4), (512, 10), ((-5i64) as u64 & 0x3fff, 14)]);
        }
        fields.extend([
            ((-1000i64) as u64 & 0xfffff, 20),
            (2000, 24),
            (600, 10),
            (0, 1),
            (720, 10),
            ((-3i64) as u64 & 0x7fff, 15),
        ]);
        pack(&fields)
    }

    #[test]
    fn header_width() {
        assert_eq!(MsmHeader::DESCRIPTOR.bit_len(), 73);
        assert_eq!(SatelliteData::DESCRIPTOR.bit_len(), 36);
        assert_eq!(SignalData::DESCRIPTOR.bit_len(), 80);
        assert_eq!(Msm7::HEADER_BITS, 169);
    }

    #[test]
    fn decode_two_by_one() {
        let dat = two_by_one();
        assert_eq!(dat.len(), 41);

        let mut cur = BitCursor::new(&dat);
        let msg = Msm7::decode(&mut Fields::new(&mut cur, 1077)).unwrap();

        assert_eq!(cur.position(), 323);
        assert_eq!(cur.position(), Msm7::bit_len(2, 1));
        assert_eq!(msg.constellation(), Some(Constellation::Gps));
        assert_eq!(msg.header.reference_station_id, 7);
        assert_eq!(msg.header.epoch_time, 345_600_000);
        assert!(msg.header.multiple_message);
        assert_eq!(msg.header.iods, 5);
        assert_eq!(msg.header.smoothing_interval, 3);

        assert_eq!(msg.satellite_ids().collect::<Vec<_>>(), [0, 3]);
        assert_eq!(msg.signal_ids().collect::<Vec<_>>(), [1]);
        assert_eq!(msg.satellites.len(), 2);
        assert_eq!(msg.satellites[1].rough_range_ms, 71);
        assert_eq!(msg.satellites[1].rough_phase_range_rate, -5);
        assert_eq!(msg.signals.len(), 1);
        assert_eq!(msg.signals[0].fine_pseudorange, -1000);
        assert_eq!(msg.signals[0].fine_phase_range, 2000);
        assert_eq!(msg.signals[0].lock_time, 600);
        assert_eq!(msg.signals[0].cnr, 720);
        assert_eq!(msg.signals[0].fine_phase_range_rate, -3);

        assert_eq!(msg.cell_mask.len(), 2);
        assert_eq!(msg.cell_mask.count(), 1);
        assert_eq!(msg.cells().collect::<Vec<_>>(), [(0, 1, true), (3, 1, false)]);
    }

    #[test]
    fn truncated_signal_block() {
        let dat = two_by_one();
        let mut cur = BitCursor::new(&dat[..40]);
        let err = Msm7::decode(&mut Fields::new(&mut cur, 1077)).unwrap_err();

        assert_eq!(err.type_code, 1077);
        assert_eq!(err.field, "fine_phase_range_rate");
        assert_eq!(err.block, Some(0));
    }

    #[test]
    fn empty_masks() {
        let mut fields = header(1127);
        fields.extend([(0, 64), (0, 32)]);
        let dat = pack(&fields);

        let mut cur = BitCursor::new(&dat);
        let msg = Msm7::decode(&mut Fields::new(&mut cur, 1127)).unwrap();

        assert_eq!(msg.constellation(), Some(Constellation::Beidou));
        assert!(msg.cell_mask.is_empty());
        assert!(msg.satellites.is_empty());
        assert_eq!(msg.cells().count(), 0);
        assert_eq!(cur.position(), Msm7::HEADER_BITS);
    }

    #[test]
    fn highest_mask_bits() {
        let mut fields = header(1097);
        fields.extend([(1 << 63, 64), (1 << 31, 32), (1, 1)]);
        fields.extend([(0, 36), (0, 80)]);
        let dat = pack(&fields);

        let mut cur = BitCursor::new(&dat);
        let msg = Msm7::decode(&mut Fields::new(&mut cur, 1097)).unwrap();
        assert_eq!(msg.cells().collect::<Vec<_>>(), [(63, 31, true)]);
    }

    #[test_case(1077, Some(Constellation::Gps))]
    #[test_case(1071, Some(Constellation::Gps))]
    #[test_case(1087, Some(Constellation::Glonass))]
    #[test_case(1097, Some(Constellation::Galileo))]
    #[test_case(1107, Some(Constellation::Sbas))]
    #[test_case(1117, Some(Constellation::Qzss))]
    #[test_case(1127, Some(Constellation::Beidou))]
    #[test_case(1137, Some(Constellation::Navic))]
    #[test_case(1078, None)]
    #[test_case(1005, None)]
    fn constellation_from_type_code(type_code: u16, expected: Option<Constellation>) {
        assert_eq!(Constellation::from_type_code(type_code), expected);
    }
}
