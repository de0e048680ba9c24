//! Error types of the compressor.

use thiserror::Error;

use crate::Prob;

/// Error variants for coding operations.
///
/// Apart from [`Error::Io`], [`Error::InvalidConfig`] and [`Error::InvalidArchive`], every variant signals that encoder
/// and decoder disagreed or that the compressed stream was damaged: the run cannot be resumed.
#[derive(Debug, Error)]
pub enum Error {
    /// A probability outside of `[PROB_MIN, PROB_MAX]` reached the coder.
    #[error("invalid probability: {0} (must lie in 1..=4095)")]
    InvalidProbability(Prob),

    /// The coding interval collapsed to zero width.
    #[error("range coder interval underflow")]
    RangeUnderflow,

    /// The decoder needed more compressed bytes than were available.
    #[error("unexpected end of the compressed stream")]
    UnexpectedEndOfStream,

    /// Sentinel framing uses the zero byte as terminator, so it can't appear in the input.
    #[error("zero byte at offset {offset} can't be encoded with sentinel framing")]
    ZeroByteInInput { offset: u64 },

    /// The model configuration is not usable.
    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),

    /// An archive header that this version can't read.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// An I/O error occurred while reading or writing data.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for coding operations.
pub type Result<T> = std::result::Result<T, Error>;
