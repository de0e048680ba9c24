use crate::mixer::Mix;
use crate::utils::{clamp_prob, squash, StretchTable, STRETCH_LIMIT};
use crate::{Prob, PROB_BITS};

/// Fractional bits of the weights.
const WEIGHT_BITS: u32 = 16;

/// The weight update is `(x · err) >> LEARNING_SHIFT`.
pub const LEARNING_SHIFT: u32 = 10;

/// Weights are kept within `[-WEIGHT_LIMIT, WEIGHT_LIMIT]`, i.e. ±16.0.
const WEIGHT_LIMIT: i32 = 16 << WEIGHT_BITS;

/// A mixer working in the logistic domain with integer arithmetic only: the inputs are
/// stretched predictions, the output is the squashed weighted sum.
#[derive(Clone, Debug)]
pub struct LogisticMixer {
    weights: Vec<i32>,
    inputs: Vec<i32>,
    stretch: StretchTable,

    /// The output of the last call to `get`.
    pr: Prob,
}

impl LogisticMixer {
    pub fn weights(&self) -> &[i32] {
        &self.weights
    }
}

impl Mix for LogisticMixer {
    fn new(inputs: usize) -> Self {
        Self {
            weights: vec![(1 << WEIGHT_BITS) / inputs.max(1) as i32; inputs],
            inputs: Vec::with_capacity(inputs),
            stretch: StretchTable::default(),
            pr: 0,
        }
    }

    #[inline]
    fn add(&mut self, p: Prob) {
        self.inputs.push(self.stretch.stretch(p));
    }

    #[inline]
    fn get(&mut self) -> Prob {
        debug_assert_eq!(self.inputs.len(), self.weights.len());

        let dot = self
            .weights
            .iter()
            .zip(&self.inputs)
            .map(|(w, x)| *w as i64 * *x as i64)
            .sum::<i64>()
            >> WEIGHT_BITS;
        let dot = dot.clamp(-STRETCH_LIMIT as i64, STRETCH_LIMIT as i64) as i32;

        self.pr = clamp_prob(squash(dot) as i64);
        self.pr
    }

    #[inline]
    fn update(&mut self, bit: u8) {
        let err = ((bit as i32) << PROB_BITS) - self.pr as i32;

        for (w, x) in self.weights.iter_mut().zip(&self.inputs) {
            *w = (*w + ((x * err) >> LEARNING_SHIFT)).clamp(-WEIGHT_LIMIT, WEIGHT_LIMIT);
        }
        self.inputs.clear();
    }
}
