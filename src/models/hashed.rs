use mem_dbg::{MemDbg, MemSize, SizeFlags};

use crate::models::{ContextModel, Input};
use crate::utils::clamp_prob;
use crate::{Node, Prob, PROB_NEUTRAL, PROB_SCALE};

/// When a count of a slot reaches this value both counts are halved.
pub const COUNT_LIMIT: u16 = 255;

/// Odd constant spreading the bit-context node over all the bits of a context hash.
const NODE_SPREAD: u64 = 0xD6E8_FEB8_6659_FD93;

/// Finalizer of the context hashes (the mixing step of splitmix64).
#[inline(always)]
pub fn finalize(mut h: u64) -> u64 {
    h ^= h >> 30;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}

/// A slot of a [`HashTable`]: the check bits of the context that owns it and the number of
/// zeros and ones seen in that context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, MemDbg, MemSize)]
#[copy_type]
pub struct Slot {
    pub check: u32,
    pub counts: [u16; 2],
}

/// What happens to a slot when a context hashes onto it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotAction {
    /// The slot belongs to the context: its counts are used and updated.
    Hit,
    /// The slot belongs to another context: it reads as unseen, and the next update throws the
    /// old statistics away.
    Reclaim,
}

/// Decides the fate of a slot owned by `stored` when it is looked up by `incoming`.
#[inline(always)]
pub fn slot_action(stored: u32, incoming: u32) -> SlotAction {
    if stored == incoming {
        SlotAction::Hit
    } else {
        SlotAction::Reclaim
    }
}

/// Turns the counts of a slot into a probability, using `(n1 + 1/2) / (n0 + n1 + 1)`.
///
/// A slot without observations yields exactly [`PROB_NEUTRAL`].
#[inline(always)]
pub fn counts_to_prob(counts: [u16; 2]) -> Prob {
    let n0 = counts[0] as i64;
    let n1 = counts[1] as i64;
    if n0 + n1 == 0 {
        return PROB_NEUTRAL;
    }
    clamp_prob((2 * n1 + 1) * PROB_SCALE as i64 / (2 * (n0 + n1) + 2))
}

/// A direct-mapped table of bit counts without chaining: on collision the newcomer takes the
/// slot over, so lookups never allocate and memory stays fixed.
#[derive(Clone, Debug, MemDbg, MemSize)]
pub struct HashTable {
    slots: Vec<Slot>,
    mask: usize,
}

impl HashTable {
    /// Creates a table with `2^bits` slots.
    pub fn new(bits: u32) -> Self {
        Self {
            slots: vec![Slot::default(); 1 << bits],
            mask: (1 << bits) - 1,
        }
    }

    /// Returns the slot index and the check bits for the given context hash.
    #[inline(always)]
    pub fn locate(&self, hash: u64) -> (usize, u32) {
        let h = finalize(hash);
        (h as usize & self.mask, (h >> 32) as u32)
    }

    #[inline(always)]
    pub fn predict(&self, index: usize, check: u32) -> Prob {
        let slot = &self.slots[index];
        match slot_action(slot.check, check) {
            SlotAction::Hit => counts_to_prob(slot.counts),
            SlotAction::Reclaim => PROB_NEUTRAL,
        }
    }

    #[inline(always)]
    pub fn update(&mut self, index: usize, check: u32, bit: u8) {
        let slot = &mut self.slots[index];
        match slot_action(slot.check, check) {
            SlotAction::Hit => {
                let bit = bit as usize;
                slot.counts[bit] += 1;
                if slot.counts[bit] >= COUNT_LIMIT {
                    slot.counts[0] >>= 1;
                    slot.counts[1] >>= 1;
                }
            }
            SlotAction::Reclaim => {
                slot.check = check;
                slot.counts = [0; 2];
                slot.counts[bit as usize] = 1;
            }
        }
    }

    pub fn slot(&self, index: usize) -> &Slot {
        &self.slots[index]
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Predicts each bit from the last `order` bytes and the bits of the current byte seen so far,
/// through a [`HashTable`].
#[derive(Clone, Debug, MemDbg, MemSize)]
pub struct HashedModel {
    order: u8,

    /// The last `order` bytes, the most recent in the lowest byte.
    window: u64,

    window_mask: u64,

    /// Hash of `window`, refreshed once per byte.
    context: u64,

    table: HashTable,

    /// Slot index and check bits of the last prediction.
    index: usize,
    check: u32,
}

impl HashedModel {
    /// Creates a model of the given order (1..=8) over a table of `2^hash_bits` slots.
    pub fn new(order: u8, hash_bits: u32) -> Self {
        let window_mask = if order >= 8 {
            u64::MAX
        } else {
            (1_u64 << (8 * order as u32)) - 1
        };
        let mut model = Self {
            order,
            window: 0,
            window_mask,
            context: 0,
            table: HashTable::new(hash_bits),
            index: 0,
            check: 0,
        };
        model.refresh_context();
        model
    }

    pub fn order(&self) -> u8 {
        self.order
    }

    pub fn table(&self) -> &HashTable {
        &self.table
    }

    fn refresh_context(&mut self) {
        self.context = finalize(self.window ^ (self.order as u64).rotate_right(8));
    }
}

impl ContextModel for HashedModel {
    fn name(&self) -> &'static str {
        "hashed"
    }

    fn update_context(&mut self, input: Input) {
        self.window = match input {
            Input::Byte(byte) => ((self.window << 8) | byte as u64) & self.window_mask,
            Input::EndOfStream => 0,
        };
        self.refresh_context();
    }

    #[inline]
    fn predict(&mut self, node: Node) -> Prob {
        let (index, check) = self
            .table
            .locate(self.context ^ (node as u64).wrapping_mul(NODE_SPREAD));
        self.index = index;
        self.check = check;
        self.table.predict(index, check)
    }

    #[inline]
    fn adapt(&mut self, bit: u8) {
        self.table.update(self.index, self.check, bit);
    }

    fn table_bytes(&self) -> usize {
        self.mem_size(SizeFlags::default())
    }
}
