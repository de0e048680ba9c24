use std::ops::Neg;

use crate::{Prob, PROB_MAX, PROB_MIN};

/// Values of [`squash`] sampled every 128 units of the stretched domain, from -2048 to 2048.
const SQUASH_POINTS: [i32; 33] = [
    1, 2, 3, 6, 10, 16, 27, 45, 73, 120, 194, 310, 488, 747, 1101, 1546, 2047, 2549, 2994, 3348,
    3607, 3785, 3901, 3975, 4022, 4050, 4068, 4079, 4085, 4089, 4092, 4093, 4094,
];

/// Biggest magnitude of a value in the stretched domain.
pub const STRETCH_LIMIT: i32 = 2047;

/// Clamps a fixed point probability computed with wider arithmetic into the legal range.
#[inline(always)]
pub fn clamp_prob(p: i64) -> Prob {
    p.clamp(PROB_MIN as i64, PROB_MAX as i64) as Prob
}

/// Returns `true` if the given probability can be fed to the coder.
#[inline(always)]
pub fn is_legal(p: Prob) -> bool {
    (PROB_MIN..=PROB_MAX).contains(&p)
}

/// Integer approximation of `4096 / (1 + e^(-d / 256))`, linearly interpolated between
/// [`SQUASH_POINTS`]. The result lies in 0..=4095.
#[inline]
pub fn squash(d: i32) -> i32 {
    if d > STRETCH_LIMIT {
        return 4095;
    }
    if d < -STRETCH_LIMIT {
        return 0;
    }
    let w = d & 127;
    let i = ((d >> 7) + 16) as usize;
    (SQUASH_POINTS[i] * (128 - w) + SQUASH_POINTS[i + 1] * w + 64) >> 7
}

/// The inverse of [`squash`], tabulated for every 12-bit probability.
///
/// The table is built from integer arithmetic only, so it is identical on every platform.
#[derive(Clone, Debug)]
pub struct StretchTable {
    table: Vec<i16>,
}

impl Default for StretchTable {
    fn default() -> Self {
        let mut table = vec![0_i16; 1 << crate::PROB_BITS];
        let mut next = 0_usize;

        for x in -STRETCH_LIMIT..=STRETCH_LIMIT {
            let v = squash(x) as usize;
            for slot in table.iter_mut().take(v + 1).skip(next) {
                *slot = x as i16;
            }
            next = v + 1;
        }
        for slot in table.iter_mut().skip(next) {
            *slot = STRETCH_LIMIT as i16;
        }
        Self { table }
    }
}

impl StretchTable {
    /// Maps a probability to the logistic domain, i.e. `ln(p / (1 - p))` scaled by 256.
    #[inline(always)]
    pub fn stretch(&self, p: Prob) -> i32 {
        self.table[p as usize] as i32
    }
}

/// Calculates the empirical entropy, in bits per symbol, of a distribution given as symbol
/// frequencies summing up to `total_freq`.
pub fn entropy(distr: &[usize], total_freq: f64) -> f64 {
    let mut entropy = 0.0;

    for freq in distr {
        if *freq == 0 {
            continue;
        }
        let pr = *freq as f64 / total_freq;
        entropy += pr * f64::log2(pr);
    }
    entropy.neg()
}

/// Returns the number of bits an ideal order-0 coder would spend on `data`.
pub fn order0_bound_bits(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut histogram = [0_usize; 256];
    data.iter().for_each(|byte| histogram[*byte as usize] += 1);

    entropy(&histogram, data.len() as f64) * data.len() as f64
}
