use crate::error::WireError;

/// Widest field the record format can carry.
pub const MAX_FIELD_BITS: u32 = 32;

/// LSB-first bit reader over one validated record.
///
/// Fields are packed little-endian with the first field in the lowest bits
/// of the first byte, and a field may straddle any number of byte
/// boundaries:
///
/// ```text
///  byte 0          byte 1          byte 2
/// ┌───────────────┬───────────────┬───────────────┐
/// │ b7 ........ b0│ b7 ........ b0│ b7 ........ b0│
/// └───────────────┴───────────────┴───────────────┘
///   field A = byte0[0..5]
///   field B = byte0[5..8] | byte1[0..7] << 3
///   field C = byte1[7]    | byte2 << 1 ...
/// ```
///
/// The accumulator is seeded with the first byte and 8 available bits.
/// Whenever a field needs more bits than are available the next byte is
/// shifted in above the existing bits. The accumulator is 64 bits wide so a
/// 32-bit field can start at any bit offset without losing its high bits.
#[derive(Debug)]
pub struct BitReader<'a> {
    buf: &'a [u8],
    pos: usize,
    store: u64,
    available: u32,
}

impl<'a> BitReader<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        match buf.first() {
            Some(&first) => Self {
                buf,
                pos: 1,
                store: u64::from(first),
                available: 8,
            },
            None => Self {
                buf,
                pos: 0,
                store: 0,
                available: 0,
            },
        }
    }

    /// Read the next `width` bits as an unsigned raw value.
    ///
    /// # Errors
    ///
    /// - [`WireError::InvalidBitWidth`] if `width` is 0 or above 32.
    /// - [`WireError::UnexpectedEof`] if the record runs out of bytes.
    pub fn read(&mut self, width: u32) -> Result<u32, WireError> {
        if width == 0 || width > MAX_FIELD_BITS {
            return Err(WireError::InvalidBitWidth { width });
        }

        while self.available < width {
            let Some(&byte) = self.buf.get(self.pos) else {
                return Err(WireError::UnexpectedEof {
                    offset: self.pos,
                    width,
                });
            };
            self.store |= u64::from(byte) << self.available;
            self.available += 8;
            self.pos += 1;
        }

        let mask = (1u64 << width) - 1;
        #[allow(clippy::cast_possible_truncation)]
        let raw = (self.store & mask) as u32;
        self.store >>= width;
        self.available -= width;
        Ok(raw)
    }

    /// Bytes pulled into the accumulator so far.
    #[must_use]
    pub fn bytes_consumed(&self) -> usize {
        self.pos
    }
}

/// Interpret the low `width` bits of `raw` as two's complement.
///
/// When the top bit of the field is set, every bit above the field is
/// filled with ones before the cast, so a 12-bit `0xFFF` becomes `-1`.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn sign_extend(raw: u32, width: u32) -> i32 {
    if width == 0 || width >= MAX_FIELD_BITS {
        raw as i32
    } else if raw & (1 << (width - 1)) != 0 {
        (raw | (u32::MAX << width)) as i32
    } else {
        raw as i32
    }
}

/// LSB-first bit writer, the inverse of [`BitReader`].
///
/// Used by the log encoder to build records and by tests to produce
/// fixtures with fields that straddle byte boundaries.
#[derive(Debug, Default)]
pub struct BitWriter {
    buf: Vec<u8>,
    store: u64,
    pending: u32,
}

impl BitWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the low `width` bits of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidBitWidth`] if `width` is 0 or above 32.
    pub fn write(&mut self, value: u32, width: u32) -> Result<(), WireError> {
        if width == 0 || width > MAX_FIELD_BITS {
            return Err(WireError::InvalidBitWidth { width });
        }

        let mask = (1u64 << width) - 1;
        self.store |= (u64::from(value) & mask) << self.pending;
        self.pending += width;

        while self.pending >= 8 {
            #[allow(clippy::cast_possible_truncation)]
            self.buf.push(self.store as u8);
            self.store >>= 8;
            self.pending -= 8;
        }
        Ok(())
    }

    /// Flush any partial byte (zero-padded in the high bits) and return the
    /// packed bytes.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        if self.pending > 0 {
            #[allow(clippy::cast_possible_truncation)]
            self.buf.push(self.store as u8);
        }
        self.buf
    }
}
