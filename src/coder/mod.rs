//! Carryless binary range coder.
//!
//! The coding interval `[low, low + range)` lives in 32-bit registers. Coding a bit with
//! probability `p` (that the bit is 1) gives the bit 1 a sub-interval of width
//! `(range >> 12) * p` at the bottom of the current interval and the bit 0 the rest.
//!
//! Renormalization follows Subbotin's scheme: the top byte of `low` is shifted out as soon as
//! it can't change anymore, and if the interval becomes narrower than [`BOTTOM`] while
//! straddling a byte boundary, `range` is clamped so that no carry can ever propagate into
//! bytes already emitted.
pub mod decoder;
pub mod encoder;

pub use decoder::RangeDecoder;
pub use encoder::RangeEncoder;

use crate::error::{Error, Result};
use crate::utils::is_legal;
use crate::{Prob, PROB_BITS};

/// Once `low` and `low + range` agree on the bits above this threshold, the top byte is settled.
pub const TOP: u32 = 1 << 24;

/// Minimum width of the coding interval.
pub const BOTTOM: u32 = 1 << 16;

/// Number of bytes making up `low`, i.e. the bytes emitted by a flush.
pub const FLUSH_BYTES: usize = 4;

/// Width of the sub-interval assigned to the bit 1.
#[inline(always)]
fn split(range: u32, p: Prob) -> Result<u32> {
    if !is_legal(p) {
        return Err(Error::InvalidProbability(p));
    }
    Ok((range >> PROB_BITS) * p as u32)
}

/// Returns `true` while the coder has to shift a byte out (or in).
///
/// When the top byte is not settled but the interval is too narrow, `range` is clamped to the
/// distance from `low` to the next multiple of [`BOTTOM`].
#[inline(always)]
fn needs_shift(low: u32, range: &mut u32) -> bool {
    if low ^ low.wrapping_add(*range) < TOP {
        return true;
    }
    if *range < BOTTOM {
        *range = low.wrapping_neg() & (BOTTOM - 1);
        return true;
    }
    false
}
