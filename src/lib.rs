//! # ctxmix
//!
//! An adaptive context-mixing compressor. Every bit of the input is predicted by a set of
//! context models, the predictions are combined by an online-learned mixer and the final
//! probability drives a carryless binary range coder.
//!
//! Encoder and decoder share the same [`Predictor`](predictor::Predictor): both sides rebuild
//! all of the adaptive state from the bytes processed so far, so nothing but the coder output
//! is ever transmitted.
//!
//! ```
//! let input = b"<page><title>Anarchism</title></page>".to_vec();
//! let stream = ctxmix::compress(&input).unwrap();
//!
//! assert_eq!(ctxmix::decompress(&stream).unwrap(), input);
//! ```
pub mod archive;
pub mod coder;
pub mod compressor;
pub mod config;
pub mod error;
pub mod mixer;
pub mod models;
pub mod predictor;
pub mod utils;

pub use archive::{compress_file, decompress_file, Archive, Stats};
pub use compressor::{
    compress, compress_with, decompress, decompress_exact, decompress_with, Compressor,
    Decompressor, Framing,
};
pub use config::{MixerKind, ModelConfig};
pub use error::{Error, Result};

/// The type representing a probability that the next bit is 1, as a 12-bit fixed point
/// number. Legal values lie in [`PROB_MIN`]..=[`PROB_MAX`].
pub type Prob = u16;

/// Number of fractional bits of a [`Prob`].
pub const PROB_BITS: u32 = 12;

/// The fixed point representation of a probability equal to 1.
pub const PROB_SCALE: u32 = 1 << PROB_BITS;

/// The smallest legal probability.
pub const PROB_MIN: Prob = 1;

/// The biggest legal probability.
pub const PROB_MAX: Prob = (PROB_SCALE - 1) as Prob;

/// The probability returned by a model that knows nothing about the current context.
pub const PROB_NEUTRAL: Prob = (PROB_SCALE / 2) as Prob;

/// The bit-context node, i.e. the bits of the current byte seen so far preceded by a leading 1.
/// It ranges in 1..=255 while a byte is being coded.
pub type Node = u32;

/// Size of the chunks in which files are read and written.
pub const IO_BUFFER_SIZE: usize = 1 << 20;
