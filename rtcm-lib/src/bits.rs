//! Most-significant-bit-first field reads from a byte buffer.

/// A read asked for more bits than remain in the buffer.
///
/// Also returned for a width above 64 bits, which no field read can satisfy.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("read of {width} bits at bit {position} exceeds {available} available bits")]
pub struct BoundsError {
    /// Cursor bit position when the read was attempted.
    pub position: usize,
    /// Requested width in bits.
    pub width: usize,
    /// Bits remaining in the buffer at `position`.
    pub available: usize,
}

/// Reads fixed-width integers at arbitrary bit offsets from a borrowed buffer.
///
/// Bits are consumed MSB-first, which is the bit order of every RTCM 3 field. A
/// failed read leaves the cursor where it was.
///
/// # Example
/// ```
/// use rtcm3::bits::BitCursor;
///
/// let mut cur = BitCursor::new(&[0x06, 0x40, 0x00, 0x00, 0x28]);
/// assert_eq!(cur.read_uint(12).unwrap(), 100);
/// assert_eq!(cur.read_uint(12).unwrap(), 0);
/// assert_eq!(cur.read_int(14).unwrap(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct BitCursor<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> BitCursor<'a> {
    /// Largest width supported by a single integer read.
    pub const MAX_WIDTH: u8 = 64;

    #[must_use]
    pub fn new(buffer: &'a [u8]) -> Self {
        BitCursor {
            buffer,
            position: 0,
        }
    }

    /// Current bit position from the start of the buffer.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total number of bits in the buffer.
    #[must_use]
    pub fn len_bits(&self) -> usize {
        self.buffer.len() * 8
    }

    /// Number of unread bits.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.len_bits() - self.position
    }

    fn check(&self, width: usize) -> Result<(), BoundsError> {
        let available = self.remaining();
        if width > available {
            return Err(BoundsError {
                position: self.position,
                width,
                available,
            });
        }
        Ok(())
    }

    /// Read `width` bits as an unsigned integer.
    ///
    /// A width of 0 reads nothing and returns 0.
    ///
    /// # Errors
    /// [BoundsError] if fewer than `width` bits remain or `width` exceeds 64.
    pub fn read_uint(&mut self, width: u8) -> Result<u64, BoundsError> {
        if width > Self::MAX_WIDTH {
            return Err(BoundsError {
                position: self.position,
                width: width.into(),
                available: self.remaining(),
            });
        }
        let mut left = usize::from(width);
        self.check(left)?;

        let mut value: u64 = 0;
        while left > 0 {
            let byte = self.buffer[self.position / 8];
            let avail = 8 - self.position % 8;
            let take = avail.min(left);
            let bits = (u16::from(byte) >> (avail - take)) & ((1u16 << take) - 1);
            value = (value << take) | u64::from(bits);
            self.position += take;
            left -= take;
        }
        Ok(value)
    }

    /// Read `width` bits as a two's-complement signed integer.
    ///
    /// # Errors
    /// [BoundsError] if fewer than `width` bits remain or `width` exceeds 64.
    pub fn read_int(&mut self, width: u8) -> Result<i64, BoundsError> {
        let raw = self.read_uint(width)?;
        Ok(sign_extend(raw, width))
    }

    /// Read a single bit.
    ///
    /// # Errors
    /// [BoundsError] if the buffer is exhausted.
    pub fn read_flag(&mut self) -> Result<bool, BoundsError> {
        Ok(self.read_uint(1)? == 1)
    }

    /// Read `count` whole bytes starting at the current (possibly unaligned) bit position.
    ///
    /// # Errors
    /// [BoundsError] if fewer than `count * 8` bits remain, in which case nothing is consumed.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, BoundsError> {
        self.check(count * 8)?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            #[allow(clippy::cast_possible_truncation)]
            out.push(self.read_uint(8)? as u8);
        }
        Ok(out)
    }

    /// Advance past `width` bits without interpreting them.
    ///
    /// # Errors
    /// [BoundsError] if fewer than `width` bits remain.
    pub fn skip(&mut self, width: usize) -> Result<(), BoundsError> {
        self.check(width)?;
        self.position += width;
        Ok(())
    }
}

/// Sign-extend the low `width` bits of `raw`.
#[allow(clippy::cast_possible_wrap)]
fn sign_extend(raw: u64, width: u8) -> i64 {
    match width {
        0 => 0,
        64.. => raw as i64,
        _ => {
            let shift = 64 - u32::from(width);
            ((raw << shift) as i64) >> shift
        }
    }
}
