use mem_dbg::{MemDbg, MemSize, SizeFlags};

use crate::models::hashed::finalize;
use crate::models::{AdaptiveCounter, ContextModel, Input};
use crate::{Node, Prob, PROB_NEUTRAL};

/// Number of bytes that must agree before a match is followed.
pub const MATCH_MIN_LEN: usize = 6;

/// Matches longer than this are not verified nor counted any further.
pub const MATCH_MAX_LEN: usize = 65_535;

/// Number of match-length buckets used as context for the counters.
const LENGTH_BUCKETS: usize = 16;

/// Adaptation rate of the counters, once warmed up.
const RATE: u8 = 5;

/// Predicts the next bit by finding the last occurrence of the most recent bytes and assuming
/// that history repeats itself.
///
/// The history is a ring buffer of fixed size; a table maps the hash of the last
/// [`MATCH_MIN_LEN`] bytes to the position that followed them. Candidates are verified byte by
/// byte, so hash collisions can only shorten matches, never produce wrong ones.
#[derive(Clone, Debug, MemDbg, MemSize)]
pub struct MatchModel {
    history: Vec<u8>,

    history_mask: usize,

    /// Position in `history` of the next byte, i.e. number of bytes seen modulo the size.
    pos: usize,

    /// Number of bytes seen, saturated at the history size.
    filled: usize,

    /// For each hash of [`MATCH_MIN_LEN`] bytes, the position of the byte that followed them.
    positions: Vec<u32>,

    /// The last [`MATCH_MIN_LEN`] bytes.
    window: u64,

    /// Position of the byte predicted by the current match.
    ptr: usize,

    /// Length of the current match, 0 if there is none.
    len: usize,

    /// Counters indexed by length bucket and expected bit.
    counters: Vec<AdaptiveCounter>,

    /// Counter used by the last prediction, if a match was active.
    current: Option<usize>,
}

impl MatchModel {
    /// Creates a model remembering the last `2^buffer_bits` bytes.
    pub fn new(buffer_bits: u32) -> Self {
        let size = 1_usize << buffer_bits;
        Self {
            history: vec![0; size],
            history_mask: size - 1,
            pos: 0,
            filled: 0,
            positions: vec![0; size >> 2],
            window: 0,
            ptr: 0,
            len: 0,
            counters: vec![AdaptiveCounter::default(); LENGTH_BUCKETS * 2],
            current: None,
        }
    }

    /// Length of the current match.
    pub fn match_len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    fn bucket(len: usize) -> usize {
        if len < 12 {
            len.saturating_sub(MATCH_MIN_LEN - 1).min(6)
        } else {
            (7 + (len.ilog2() as usize - 3)).min(LENGTH_BUCKETS - 1)
        }
    }

    #[inline(always)]
    fn hash_slot(&self) -> usize {
        finalize(self.window) as usize & (self.positions.len() - 1)
    }

    /// Counts how many bytes before `candidate` agree with the bytes before `pos`.
    fn verify(&self, candidate: usize) -> usize {
        let mut len = 0;
        while len < MATCH_MAX_LEN && len < self.filled - 1 {
            let a = self.history[candidate.wrapping_sub(len + 1) & self.history_mask];
            let b = self.history[self.pos.wrapping_sub(len + 1) & self.history_mask];
            if a != b {
                break;
            }
            len += 1;
        }
        len
    }

    fn push(&mut self, byte: u8) {
        if self.len > 0 && self.history[self.ptr] == byte {
            self.len = (self.len + 1).min(MATCH_MAX_LEN);
            self.ptr = (self.ptr + 1) & self.history_mask;
        } else {
            self.len = 0;
        }

        self.history[self.pos] = byte;
        self.pos = (self.pos + 1) & self.history_mask;
        self.filled = (self.filled + 1).min(self.history.len());
        self.window = ((self.window << 8) | byte as u64) & ((1 << (8 * MATCH_MIN_LEN)) - 1);

        if self.filled < MATCH_MIN_LEN {
            return;
        }

        let slot = self.hash_slot();
        if self.len == 0 {
            let candidate = self.positions[slot] as usize & self.history_mask;
            if candidate != self.pos {
                let len = self.verify(candidate);
                if len >= MATCH_MIN_LEN {
                    self.len = len;
                    self.ptr = candidate;
                }
            }
        }
        self.positions[slot] = self.pos as u32;
    }
}

impl ContextModel for MatchModel {
    fn name(&self) -> &'static str {
        "match"
    }

    fn update_context(&mut self, input: Input) {
        match input {
            Input::Byte(byte) => self.push(byte),
            Input::EndOfStream => {
                self.len = 0;
                self.window = 0;
            }
        }
    }

    fn predict(&mut self, node: Node) -> Prob {
        self.current = None;
        if self.len == 0 {
            return PROB_NEUTRAL;
        }

        let expected = self.history[self.ptr] as Node | 0x100;
        let seen = Node::BITS - 1 - node.leading_zeros();
        if expected >> (8 - seen) != node {
            // the current byte already differs from the predicted one
            self.len = 0;
            return PROB_NEUTRAL;
        }

        let bit = ((expected >> (7 - seen)) & 1) as usize;
        let index = Self::bucket(self.len) * 2 + bit;
        self.current = Some(index);
        self.counters[index].p()
    }

    fn adapt(&mut self, bit: u8) {
        if let Some(index) = self.current {
            self.counters[index].update(bit, RATE);
        }
    }

    fn table_bytes(&self) -> usize {
        self.mem_size(SizeFlags::default())
    }
}
