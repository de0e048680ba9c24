use mem_dbg::{MemDbg, MemSize, SizeFlags};

use crate::models::{AdaptiveCounter, ContextModel, Input};
use crate::{Node, Prob};

/// Predicts each bit from the bits of the current byte seen so far, ignoring any history.
#[derive(Clone, Debug, MemDbg, MemSize)]
pub struct Order0 {
    /// One counter for each bit-context node.
    counters: Vec<AdaptiveCounter>,

    /// The node of the last prediction.
    current: usize,

    rate: u8,
}

impl Order0 {
    pub fn new(rate: u8) -> Self {
        Self {
            counters: vec![AdaptiveCounter::default(); 256],
            current: 1,
            rate,
        }
    }

    /// Returns the counter associated with the given node.
    pub fn counter(&self, node: Node) -> &AdaptiveCounter {
        &self.counters[node as usize]
    }
}

impl ContextModel for Order0 {
    fn name(&self) -> &'static str {
        "order-0"
    }

    fn update_context(&mut self, _input: Input) {}

    #[inline]
    fn predict(&mut self, node: Node) -> Prob {
        self.current = node as usize;
        self.counters[self.current].p()
    }

    #[inline]
    fn adapt(&mut self, bit: u8) {
        self.counters[self.current].update(bit, self.rate);
    }

    fn table_bytes(&self) -> usize {
        self.mem_size(SizeFlags::default())
    }
}
