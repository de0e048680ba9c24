use crate::coder::{needs_shift, split, FLUSH_BYTES};
use crate::error::{Error, Result};
use crate::Prob;

/// The encoding side of the binary range coder.
///
/// Bytes are appended to an internal buffer that callers can drain at any time with
/// [`take_output`](Self::take_output), so arbitrarily long inputs can be streamed out.
#[derive(Clone, Debug)]
pub struct RangeEncoder {
    low: u32,

    range: u32,

    /// The bytes settled so far and not yet taken by the caller.
    output: Vec<u8>,

    /// How many bytes have been emitted since the creation of the encoder.
    emitted: u64,
}

impl Default for RangeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeEncoder {
    pub fn new() -> Self {
        Self {
            low: 0,
            range: u32::MAX,
            output: Vec::new(),
            emitted: 0,
        }
    }

    /// Encodes `bit` knowing that the probability of it being 1 is `p / 4096`.
    ///
    /// Returns an error if `p` is not a legal probability: that can only happen if the model
    /// driving the coder is broken, and the stream written so far must be discarded.
    #[inline]
    pub fn encode_bit(&mut self, bit: u8, p: Prob) -> Result<()> {
        let r1 = split(self.range, p)?;

        if bit != 0 {
            self.range = r1;
        } else {
            self.low = self.low.wrapping_add(r1);
            self.range -= r1;
        }

        while needs_shift(self.low, &mut self.range) {
            self.output.push((self.low >> 24) as u8);
            self.low <<= 8;
            self.range <<= 8;
            self.emitted += 1;
        }

        if self.range == 0 {
            return Err(Error::RangeUnderflow);
        }
        Ok(())
    }

    /// Emits the bytes needed to identify a point of the final interval. After a flush the
    /// encoder is back in its initial state.
    pub fn flush(&mut self) {
        for _ in 0..FLUSH_BYTES {
            self.output.push((self.low >> 24) as u8);
            self.low <<= 8;
        }
        self.emitted += FLUSH_BYTES as u64;
        self.low = 0;
        self.range = u32::MAX;
    }

    /// Drains the bytes produced so far.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    /// Returns the number of bytes emitted so far, including those already taken.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Flushes the encoder and returns the bytes not yet taken.
    pub fn finish(mut self) -> Vec<u8> {
        self.flush();
        self.output
    }
}
