use crate::coder::{needs_shift, split, FLUSH_BYTES};
use crate::error::{Error, Result};
use crate::Prob;

/// The decoding side of the binary range coder, reading from an in-memory compressed stream.
///
/// The decoder performs exactly the same interval arithmetic as [`RangeEncoder`](super::RangeEncoder),
/// so it consumes a compressed byte exactly when the encoder emitted one.
#[derive(Clone, Debug)]
pub struct RangeDecoder<'a> {
    stream: &'a [u8],

    /// Index of the next byte of `stream` to read.
    pos: usize,

    low: u32,

    range: u32,

    /// The bits of the compressed stream aligned with `low`.
    code: u32,
}

impl<'a> RangeDecoder<'a> {
    /// Creates a decoder positioned at the beginning of `stream`.
    ///
    /// Fails if the stream is too short to hold even a flushed empty interval.
    pub fn new(stream: &'a [u8]) -> Result<Self> {
        let mut decoder = Self {
            stream,
            pos: 0,
            low: 0,
            range: u32::MAX,
            code: 0,
        };
        for _ in 0..FLUSH_BYTES {
            decoder.code = (decoder.code << 8) | decoder.next_byte()? as u32;
        }
        Ok(decoder)
    }

    /// Decodes a bit that was encoded with probability `p / 4096` of being 1.
    #[inline]
    pub fn decode_bit(&mut self, p: Prob) -> Result<u8> {
        let r1 = split(self.range, p)?;

        let bit = if self.code.wrapping_sub(self.low) < r1 {
            self.range = r1;
            1
        } else {
            self.low = self.low.wrapping_add(r1);
            self.range -= r1;
            0
        };

        while needs_shift(self.low, &mut self.range) {
            self.code = (self.code << 8) | self.next_byte()? as u32;
            self.low <<= 8;
            self.range <<= 8;
        }

        if self.range == 0 {
            return Err(Error::RangeUnderflow);
        }
        Ok(bit)
    }

    /// Returns how many bytes of the stream have been read so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }

    /// Returns the bytes of the stream that have not been read yet.
    pub fn remaining(&self) -> &'a [u8] {
        &self.stream[self.pos..]
    }

    #[inline(always)]
    fn next_byte(&mut self) -> Result<u8> {
        let byte = *self
            .stream
            .get(self.pos)
            .ok_or(Error::UnexpectedEndOfStream)?;
        self.pos += 1;
        Ok(byte)
    }
}
