use log::info;

use crate::coder::{RangeDecoder, RangeEncoder};
use crate::config::{MixerKind, ModelConfig};
use crate::error::{Error, Result};
use crate::mixer::{LinearMixer, LogisticMixer, Mix};
use crate::models::Input;
use crate::predictor::Predictor;

/// How the end of the coded data is recognised by the decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Framing {
    /// The stream ends with an encoded zero byte. Inputs must not contain zero bytes.
    Sentinel,
    /// Nothing marks the end: the decoder must be told how many bytes to decode. Any input is
    /// accepted.
    Length,
}

/// Compresses a byte stream, possibly fed in several chunks.
///
/// Compressed bytes become available as soon as the coder emits them and can be drained with
/// [`take_output`](Self::take_output); [`finish`](Self::finish) terminates the stream.
pub struct Compressor<M: Mix = LinearMixer> {
    predictor: Predictor<M>,
    encoder: RangeEncoder,
    framing: Framing,

    /// Number of input bytes encoded so far.
    bytes_in: u64,
}

impl<M: Mix> Compressor<M> {
    pub fn new(config: &ModelConfig, framing: Framing) -> Result<Self> {
        Ok(Self {
            predictor: Predictor::new(config)?,
            encoder: RangeEncoder::new(),
            framing,
            bytes_in: 0,
        })
    }

    /// Encodes the given bytes.
    ///
    /// With [`Framing::Sentinel`] a chunk containing a zero byte is rejected as a whole, before
    /// anything of it is encoded.
    pub fn push(&mut self, data: &[u8]) -> Result<()> {
        if self.framing == Framing::Sentinel {
            if let Some(pos) = data.iter().position(|byte| *byte == 0) {
                return Err(Error::ZeroByteInInput {
                    offset: self.bytes_in + pos as u64,
                });
            }
        }

        for byte in data {
            self.encode_byte(*byte)?;
        }
        Ok(())
    }

    /// Drains the compressed bytes produced so far.
    pub fn take_output(&mut self) -> Vec<u8> {
        self.encoder.take_output()
    }

    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Number of compressed bytes produced so far, drained or not.
    pub fn bytes_out(&self) -> u64 {
        self.encoder.emitted()
    }

    /// Appends the end marker if the framing needs one, flushes the coder and returns the
    /// compressed bytes not yet drained.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        if self.framing == Framing::Sentinel {
            for _ in 0..8 {
                let p = self.predictor.p();
                self.encoder.encode_bit(0, p)?;
                self.predictor.update(0);
            }
            self.predictor.update_context(Input::EndOfStream);
        }

        self.encoder.flush();
        info!(
            "Compressed {} bytes into {} bytes",
            self.bytes_in,
            self.encoder.emitted()
        );
        Ok(self.encoder.take_output())
    }

    #[inline]
    fn encode_byte(&mut self, byte: u8) -> Result<()> {
        for shift in (0..8).rev() {
            let bit = (byte >> shift) & 1;
            let p = self.predictor.p();
            self.encoder.encode_bit(bit, p)?;
            self.predictor.update(bit);
        }
        self.predictor.update_context(Input::Byte(byte));
        self.bytes_in += 1;
        Ok(())
    }
}

/// Decompresses a stream produced by a [`Compressor`] with the same configuration and framing.
pub struct Decompressor<'a, M: Mix = LinearMixer> {
    predictor: Predictor<M>,
    decoder: RangeDecoder<'a>,
    framing: Framing,

    /// Set once the end marker has been decoded.
    finished: bool,

    /// Number of bytes decoded so far.
    bytes_out: u64,
}

impl<'a, M: Mix> Decompressor<'a, M> {
    pub fn new(config: &ModelConfig, stream: &'a [u8], framing: Framing) -> Result<Self> {
        Ok(Self {
            predictor: Predictor::new(config)?,
            decoder: RangeDecoder::new(stream)?,
            framing,
            finished: false,
            bytes_out: 0,
        })
    }

    /// Decodes the next byte. Returns `None` once the end marker of a [`Framing::Sentinel`]
    /// stream has been decoded; with [`Framing::Length`] a byte is always decoded.
    pub fn decode_byte(&mut self) -> Result<Option<u8>> {
        if self.finished {
            return Ok(None);
        }

        let byte = loop {
            let p = self.predictor.p();
            let bit = self.decoder.decode_bit(p)?;
            if let Some(byte) = self.predictor.update(bit) {
                break byte;
            }
        };

        if byte == 0 && self.framing == Framing::Sentinel {
            self.predictor.update_context(Input::EndOfStream);
            self.finished = true;
            return Ok(None);
        }

        self.predictor.update_context(Input::Byte(byte));
        self.bytes_out += 1;
        Ok(Some(byte))
    }

    /// Decodes up to the end marker, appending to `out`.
    pub fn decode_to_end(&mut self, out: &mut Vec<u8>) -> Result<()> {
        while let Some(byte) = self.decode_byte()? {
            out.push(byte);
        }
        Ok(())
    }

    /// Decodes exactly `len` bytes, appending to `out`.
    pub fn decode_exact(&mut self, len: usize, out: &mut Vec<u8>) -> Result<()> {
        out.reserve(len);
        for _ in 0..len {
            match self.decode_byte()? {
                Some(byte) => out.push(byte),
                None => return Err(Error::UnexpectedEndOfStream),
            }
        }
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    /// Number of compressed bytes read so far.
    pub fn consumed(&self) -> usize {
        self.decoder.consumed()
    }
}

/// Compresses `input` with the default models into a sentinel-terminated stream.
///
/// Fails with [`Error::ZeroByteInInput`] if `input` contains a zero byte: use
/// [`compress_with`] and [`Framing::Length`] for arbitrary binary data.
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    compress_with(input, &ModelConfig::default(), Framing::Sentinel)
}

/// Decompresses a sentinel-terminated stream produced by [`compress`].
pub fn decompress(stream: &[u8]) -> Result<Vec<u8>> {
    decompress_with(stream, &ModelConfig::default())
}

/// Compresses `input` with the given models and framing.
pub fn compress_with(input: &[u8], config: &ModelConfig, framing: Framing) -> Result<Vec<u8>> {
    match config.mixer {
        MixerKind::Linear => compress_all::<LinearMixer>(input, config, framing),
        MixerKind::Logistic => compress_all::<LogisticMixer>(input, config, framing),
    }
}

/// Decompresses a sentinel-terminated stream compressed with the given models.
pub fn decompress_with(stream: &[u8], config: &ModelConfig) -> Result<Vec<u8>> {
    match config.mixer {
        MixerKind::Linear => decompress_all::<LinearMixer>(stream, config, None),
        MixerKind::Logistic => decompress_all::<LogisticMixer>(stream, config, None),
    }
}

/// Decompresses the first `len` bytes of a length-framed stream compressed with the given
/// models.
pub fn decompress_exact(stream: &[u8], config: &ModelConfig, len: usize) -> Result<Vec<u8>> {
    match config.mixer {
        MixerKind::Linear => decompress_all::<LinearMixer>(stream, config, Some(len)),
        MixerKind::Logistic => decompress_all::<LogisticMixer>(stream, config, Some(len)),
    }
}

fn compress_all<M: Mix>(input: &[u8], config: &ModelConfig, framing: Framing) -> Result<Vec<u8>> {
    let mut compressor = Compressor::<M>::new(config, framing)?;
    compressor.push(input)?;
    compressor.finish()
}

fn decompress_all<M: Mix>(
    stream: &[u8],
    config: &ModelConfig,
    len: Option<usize>,
) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match len {
        None => {
            let mut decompressor = Decompressor::<M>::new(config, stream, Framing::Sentinel)?;
            decompressor.decode_to_end(&mut out)?;
        }
        Some(0) => {}
        Some(len) => {
            let mut decompressor = Decompressor::<M>::new(config, stream, Framing::Length)?;
            decompressor.decode_exact(len, &mut out)?;
        }
    }
    Ok(out)
}
