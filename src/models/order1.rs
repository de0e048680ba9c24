use mem_dbg::{MemDbg, MemSize, SizeFlags};

use crate::models::{AdaptiveCounter, ContextModel, Input};
use crate::{Node, Prob};

/// Predicts each bit from the previous byte and the bits of the current byte seen so far.
///
/// Before the first byte the previous byte is taken to be 0, whose counters start neutral.
#[derive(Clone, Debug, MemDbg, MemSize)]
pub struct Order1 {
    /// 256 counters, one per bit-context node, for each value of the previous byte.
    counters: Vec<AdaptiveCounter>,

    /// Offset in `counters` of the block selected by the previous byte.
    base: usize,

    /// Index of the counter of the last prediction.
    current: usize,

    rate: u8,
}

impl Order1 {
    pub fn new(rate: u8) -> Self {
        Self {
            counters: vec![AdaptiveCounter::default(); 256 * 256],
            base: 0,
            current: 0,
            rate,
        }
    }

    /// Returns the counter used after `previous` when the current byte starts with `node`.
    pub fn counter(&self, previous: u8, node: Node) -> &AdaptiveCounter {
        &self.counters[(previous as usize) << 8 | node as usize]
    }
}

impl ContextModel for Order1 {
    fn name(&self) -> &'static str {
        "order-1"
    }

    fn update_context(&mut self, input: Input) {
        self.base = match input {
            Input::Byte(byte) => (byte as usize) << 8,
            Input::EndOfStream => 0,
        };
    }

    #[inline]
    fn predict(&mut self, node: Node) -> Prob {
        self.current = self.base | node as usize;
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
