use crate::mixer::Mix;
use crate::utils::clamp_prob;
use crate::{Prob, PROB_SCALE};

/// Learning rate of the LMS update.
pub const LEARNING_RATE: f32 = 0.002;

/// Weights and bias are kept within `[-WEIGHT_LIMIT, WEIGHT_LIMIT]`.
pub const WEIGHT_LIMIT: f32 = 8.0;

/// A linear mixer: the output is `bias + Σ wᵢ·xᵢ` where `xᵢ` is the i-th prediction scaled to
/// (0, 1), and weights follow the least-mean-squares rule.
///
/// All the arithmetic is plain `f32` additions and multiplications in a fixed order, and the
/// only conversion back to fixed point is a single `round`, so encoder and decoder built from
/// the same code compute bit-identical outputs.
#[derive(Clone, Debug)]
pub struct LinearMixer {
    weights: Vec<f32>,
    bias: f32,
    inputs: Vec<f32>,

    /// The unclamped output of the last call to `get`.
    dot: f32,
}

impl LinearMixer {
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }
}

impl Mix for LinearMixer {
    fn new(inputs: usize) -> Self {
        Self {
            weights: vec![1.0 / inputs.max(1) as f32; inputs],
            bias: 0.0,
            inputs: Vec::with_capacity(inputs),
            dot: 0.0,
        }
    }

    #[inline]
    fn add(&mut self, p: Prob) {
        self.inputs.push(p as f32 / PROB_SCALE as f32);
    }

    #[inline]
    fn get(&mut self) -> Prob {
        debug_assert_eq!(self.inputs.len(), self.weights.len());

        let mut dot = self.bias;
        for (w, x) in self.weights.iter().zip(&self.inputs) {
            dot += w * x;
        }
        self.dot = dot;
        clamp_prob((dot * PROB_SCALE as f32).round() as i64)
    }

    #[inline]
    fn update(&mut self, bit: u8) {
        let err = bit as f32 - self.dot;

        for (w, x) in self.weights.iter_mut().zip(&self.inputs) {
            *w = (*w + LEARNING_RATE * err * x).clamp(-WEIGHT_LIMIT, WEIGHT_LIMIT);
        }
        self.bias = (self.bias + LEARNING_RATE * err).clamp(-WEIGHT_LIMIT, WEIGHT_LIMIT);
        self.inputs.clear();
    }
}
