use mem_dbg::{MemDbg, MemSize};

use crate::{Prob, PROB_MAX, PROB_MIN, PROB_NEUTRAL};

/// Number of fractional bits kept by the counter beyond the 12 bits of a [`Prob`].
const EXTRA_BITS: u32 = 4;

const STATE_MIN: u16 = PROB_MIN << EXTRA_BITS;

const STATE_MAX: u16 = (PROB_MAX << EXTRA_BITS) | ((1 << EXTRA_BITS) - 1);

/// An adaptive estimate of the probability that a bit is 1.
///
/// The estimate moves towards each observed bit by a fraction `1 / 2^shift` of its distance from
/// it. The shift starts at 1 and grows by one per observation up to the configured rate, so that a
/// new context learns quickly and then settles. The state is kept with 16 bits of precision and
/// is clamped so that the 12-bit probability never leaves `[PROB_MIN, PROB_MAX]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, MemDbg, MemSize)]
#[copy_type]
pub struct AdaptiveCounter {
    state: u16,
    hits: u8,
}

impl Default for AdaptiveCounter {
    fn default() -> Self {
        Self {
            state: PROB_NEUTRAL << EXTRA_BITS,
            hits: 0,
        }
    }
}

impl AdaptiveCounter {
    #[inline(always)]
    pub fn p(&self) -> Prob {
        self.state >> EXTRA_BITS
    }

    /// Moves the estimate towards `bit`, never adapting slower than `1 / 2^rate`.
    #[inline(always)]
    pub fn update(&mut self, bit: u8, rate: u8) {
        let shift = (self.hits + 1).min(rate);
        let target = (bit as i32) << 16;
        let state = self.state as i32;
        let next = state + ((target - state) >> shift);

        self.state = next.clamp(STATE_MIN as i32, STATE_MAX as i32) as u16;
        if self.hits < rate {
            self.hits += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_starts_neutral() {
        assert_eq!(AdaptiveCounter::default().p(), PROB_NEUTRAL);
    }

    #[test]
    fn test_counter_learns_fast_then_settles() {
        let mut counter = AdaptiveCounter::default();
        counter.update(1, 4);
        // the first observation halves the distance from 1
        assert_eq!(counter.p(), 3072);

        for _ in 0..200 {
            counter.update(1, 4);
        }
        assert_eq!(counter.p(), PROB_MAX);
    }

    #[test]
    fn test_counter_stays_legal() {
        let mut counter = AdaptiveCounter::default();
        for _ in 0..1000 {
            counter.update(0, 2);
            assert!(counter.p() >= PROB_MIN);
        }
        assert_eq!(counter.p(), PROB_MIN);

        for _ in 0..1000 {
            counter.update(1, 2);
            assert!(counter.p() <= PROB_MAX);
        }
        assert_eq!(counter.p(), PROB_MAX);
    }
}
