//! Mixers combine the predictions of the context models into the probability given to the coder.
//!
//! For every bit the driver calls [`Mix::add`] once per model, always in the same order, then
//! [`Mix::get`] exactly once before the bit is known and [`Mix::update`] exactly once after.
//! Weights are never persisted: every stream starts from the same initialization.
pub mod linear;
pub mod logistic;

pub use linear::LinearMixer;
pub use logistic::LogisticMixer;

use crate::Prob;

pub trait Mix {
    /// Creates a mixer for `inputs` predictions per bit.
    fn new(inputs: usize) -> Self
    where
        Self: Sized;

    /// Supplies the prediction of the next model.
    fn add(&mut self, p: Prob);

    /// Returns the combined prediction, always in `[PROB_MIN, PROB_MAX]`.
    fn get(&mut self) -> Prob;

    /// Learns from the true bit and gets ready for the next one.
    fn update(&mut self, bit: u8);
}
