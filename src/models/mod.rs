//! Context models.
//!
//! Every model maps some view of the history to the probability that the next bit is 1. The
//! per-bit protocol is always `predict` followed by `adapt` with the true bit; at the end of each
//! byte the driver calls `update_context` to roll the history forward.
pub mod counter;
pub mod hashed;
pub mod match_model;
pub mod order0;
pub mod order1;
pub mod xml;

pub use counter::AdaptiveCounter;
pub use hashed::{HashTable, HashedModel, SlotAction};
pub use match_model::MatchModel;
pub use order0::Order0;
pub use order1::Order1;
pub use xml::XmlModel;

use crate::{Node, Prob};

/// What the driver reports to the models once a byte has been fully coded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    /// A byte of the original data.
    Byte(u8),
    /// The end-of-stream sentinel. Models with a history forget it, so that a new stream could
    /// be coded as if from the start.
    EndOfStream,
}

/// An adaptive predictor of the next bit.
pub trait ContextModel {
    /// A short name used in logs.
    fn name(&self) -> &'static str;

    /// Rolls the history forward after a byte (or the sentinel) has been coded.
    fn update_context(&mut self, input: Input);

    /// Predicts the next bit given the bits of the current byte seen so far.
    ///
    /// The result always lies in `[PROB_MIN, PROB_MAX]`.
    fn predict(&mut self, node: Node) -> Prob;

    /// Learns the bit that followed the last call to [`predict`](Self::predict).
    fn adapt(&mut self, bit: u8);

    /// Heap memory used by the tables of the model, in bytes.
    fn table_bytes(&self) -> usize;
}
