//! File-level compression, either as a raw sentinel-terminated stream or wrapped in an
//! [`Archive`] that records everything needed to decode it.
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use dsi_progress_logger::{ProgressLog, ProgressLogger};
use epserde::prelude::*;
use log::info;
use mem_dbg::{MemDbg, MemSize};
use tempfile::NamedTempFile;

use crate::compressor::{Compressor, Decompressor, Framing};
use crate::config::{MixerKind, ModelConfig};
use crate::error::Error;
use crate::mixer::{LinearMixer, LogisticMixer, Mix};
use crate::IO_BUFFER_SIZE;

/// Identifies an archive, i.e. `b"CTXMIX\0\0"` read as a little-endian integer.
pub const MAGIC: u64 = u64::from_le_bytes(*b"CTXMIX\0\0");

/// The format version written by this crate.
pub const VERSION: u32 = 1;

const FLAG_MATCH: u8 = 1;
const FLAG_XML: u8 = 1 << 1;

/// A compressed file: the model configuration, the length of the original data and the coder
/// stream in length framing, so that any byte, zero included, can be stored.
#[derive(Clone, Debug, PartialEq, Eq, Epserde, MemDbg, MemSize)]
pub struct Archive {
    pub magic: u64,

    pub version: u32,

    /// Length in bytes of the original data.
    pub original_len: u64,

    /// Orders of the hashed models.
    pub orders: Vec<u8>,

    pub hash_bits: u32,

    pub counter_rate: u8,

    /// The id of the [`MixerKind`].
    pub mixer: u8,

    /// Which optional models are enabled.
    pub flags: u8,

    /// The compressed data.
    pub stream: Vec<u8>,
}

impl Archive {
    pub fn new(config: &ModelConfig, original_len: u64, stream: Vec<u8>) -> Self {
        let mut flags = 0;
        if config.match_model {
            flags |= FLAG_MATCH;
        }
        if config.xml_model {
            flags |= FLAG_XML;
        }

        Self {
            magic: MAGIC,
            version: VERSION,
            original_len,
            orders: config.hashed_orders.clone(),
            hash_bits: config.hash_bits,
            counter_rate: config.counter_rate,
            mixer: config.mixer.id(),
            flags,
            stream,
        }
    }

    /// Checks the header and rebuilds the configuration the stream was compressed with.
    pub fn config(&self) -> crate::Result<ModelConfig> {
        if self.magic != MAGIC {
            return Err(Error::InvalidArchive(format!(
                "bad magic number {:#018x}",
                self.magic
            )));
        }
        if self.version != VERSION {
            return Err(Error::InvalidArchive(format!(
                "unsupported version {} (expected {VERSION})",
                self.version
            )));
        }
        if self.flags & !(FLAG_MATCH | FLAG_XML) != 0 {
            return Err(Error::InvalidArchive(format!(
                "unknown flags {:#04x}",
                self.flags
            )));
        }

        let config = ModelConfig {
            hashed_orders: self.orders.clone(),
            hash_bits: self.hash_bits,
            counter_rate: self.counter_rate,
            mixer: MixerKind::from_id(self.mixer)?,
            match_model: self.flags & FLAG_MATCH != 0,
            xml_model: self.flags & FLAG_XML != 0,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Sizes of a compression or decompression run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stats {
    /// Length of the original data.
    pub original: u64,

    /// Length of the compressed file.
    pub compressed: u64,
}

impl Stats {
    /// Compressed bits per original byte.
    pub fn bits_per_byte(&self) -> f64 {
        if self.original == 0 {
            return 0.0;
        }
        self.compressed as f64 * 8.0 / self.original as f64
    }
}

/// Compresses the file at `input` into `output`.
///
/// With `raw` the output is the bare sentinel-terminated coder stream, which can't hold zero
/// bytes and must be decompressed with the same `config`; otherwise it is an [`Archive`].
///
/// The result is written to a temporary file next to `output` and renamed onto it only once
/// compression succeeded: on error `output` is left as it was, and `input` may be `output`.
pub fn compress_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ModelConfig,
    raw: bool,
) -> Result<Stats> {
    let input = input.as_ref();
    let output = output.as_ref();
    config.validate()?;

    let file = File::open(input).with_context(|| format!("Could not open {}", input.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("Could not stat {}", input.display()))?
        .len();
    let mut reader = BufReader::with_capacity(IO_BUFFER_SIZE, file);

    info!(
        "Compressing {} ({} bytes) into {}",
        input.display(),
        len,
        output.display()
    );

    let mut temp = sibling_temp_file(output)?;
    let original = {
        let mut writer = BufWriter::with_capacity(IO_BUFFER_SIZE, temp.as_file_mut());
        let original = if raw {
            compress_stream(&mut reader, &mut writer, config, Framing::Sentinel, len)?.0
        } else {
            let mut stream = Vec::new();
            let (original, _) =
                compress_stream(&mut reader, &mut stream, config, Framing::Length, len)?;
            Archive::new(config, original, stream)
                .serialize(&mut writer)
                .with_context(|| format!("Could not serialize archive to {}", output.display()))?;
            original
        };
        writer
            .flush()
            .with_context(|| format!("Could not write {}", output.display()))?;
        original
    };
    drop(reader);

    let stats = Stats {
        original,
        compressed: persist(temp, output)?,
    };
    info!(
        "Compressed {} bytes into {} bytes ({:.3} bits/byte)",
        stats.original,
        stats.compressed,
        stats.bits_per_byte()
    );
    Ok(stats)
}

/// Decompresses the file at `input` into `output`.
///
/// With `raw` the input must be a sentinel-terminated stream compressed with `config`;
/// otherwise it must be an [`Archive`], and `config` is ignored in favour of the stored one.
///
/// As with [`compress_file`], `output` is replaced only once decompression succeeded.
pub fn decompress_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ModelConfig,
    raw: bool,
) -> Result<Stats> {
    let input = input.as_ref();
    let output = output.as_ref();

    info!("Decompressing {} into {}", input.display(), output.display());

    let mut temp = sibling_temp_file(output)?;
    let (original, compressed) = {
        let mut writer = BufWriter::with_capacity(IO_BUFFER_SIZE, temp.as_file_mut());
        let sizes = if raw {
            let mut stream = Vec::new();
            BufReader::with_capacity(
                IO_BUFFER_SIZE,
                File::open(input)
                    .with_context(|| format!("Could not open {}", input.display()))?,
            )
            .read_to_end(&mut stream)
            .with_context(|| format!("Could not read {}", input.display()))?;

            let original = decompress_stream(&stream, &mut writer, config, None)?;
            (original, stream.len() as u64)
        } else {
            let archive = Archive::load_full(input)
                .with_context(|| format!("Could not load archive {}", input.display()))?;
            let config = archive
                .config()
                .with_context(|| format!("Could not read the header of {}", input.display()))?;
            let compressed = std::fs::metadata(input)
                .with_context(|| format!("Could not stat {}", input.display()))?
                .len();

            let original = decompress_stream(
                &archive.stream,
                &mut writer,
                &config,
                Some(archive.original_len),
            )?;
            (original, compressed)
        };
        writer
            .flush()
            .with_context(|| format!("Could not write {}", output.display()))?;
        sizes
    };
    persist(temp, output)?;

    let stats = Stats {
        original,
        compressed,
    };
    info!("Decompressed {} bytes", stats.original);
    Ok(stats)
}

/// Creates a temporary file in the directory of `path`, so that it can be renamed onto it.
/// The file is deleted if it is dropped before [`persist`].
fn sibling_temp_file(path: &Path) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    NamedTempFile::new_in(dir)
        .with_context(|| format!("Could not create a temporary file in {}", dir.display()))
}

/// Renames `temp` onto `path`, returning the length of the file.
fn persist(temp: NamedTempFile, path: &Path) -> Result<u64> {
    let file = temp
        .persist(path)
        .with_context(|| format!("Could not create {}", path.display()))?;
    Ok(file
        .metadata()
        .with_context(|| format!("Could not stat {}", path.display()))?
        .len())
}

/// Compresses everything `reader` yields into `writer`, returning the number of bytes read and
/// written.
fn compress_stream(
    reader: &mut impl Read,
    writer: &mut impl Write,
    config: &ModelConfig,
    framing: Framing,
    expected_len: u64,
) -> Result<(u64, u64)> {
    match config.mixer {
        MixerKind::Linear => {
            compress_stream_with::<LinearMixer>(reader, writer, config, framing, expected_len)
        }
        MixerKind::Logistic => {
            compress_stream_with::<LogisticMixer>(reader, writer, config, framing, expected_len)
        }
    }
}

fn compress_stream_with<M: Mix>(
    reader: &mut impl Read,
    writer: &mut impl Write,
    config: &ModelConfig,
    framing: Framing,
    expected_len: u64,
) -> Result<(u64, u64)> {
    let mut compressor = Compressor::<M>::new(config, framing)?;
    let mut buffer = vec![0; IO_BUFFER_SIZE];
    let mut written = 0;

    let mut pl = ProgressLogger::default();
    pl.item_name("byte")
        .expected_updates(Some(expected_len as usize));
    pl.start("Compressing...");

    loop {
        let read = reader.read(&mut buffer).context("Could not read input")?;
        if read == 0 {
            break;
        }
        compressor.push(&buffer[..read])?;

        let out = compressor.take_output();
        writer.write_all(&out).context("Could not write output")?;
        written += out.len() as u64;
        pl.update_with_count(read);
    }

    let read = compressor.bytes_in();
    let out = compressor.finish()?;
    writer.write_all(&out).context("Could not write output")?;
    written += out.len() as u64;
    pl.done();

    Ok((read, written))
}

/// Decodes `stream` into `writer`, up to the end marker if `len` is `None`, returning the number
/// of bytes written.
fn decompress_stream(
    stream: &[u8],
    writer: &mut impl Write,
    config: &ModelConfig,
    len: Option<u64>,
) -> Result<u64> {
    match config.mixer {
        MixerKind::Linear => decompress_stream_with::<LinearMixer>(stream, writer, config, len),
        MixerKind::Logistic => {
            decompress_stream_with::<LogisticMixer>(stream, writer, config, len)
        }
    }
}

fn decompress_stream_with<M: Mix>(
    stream: &[u8],
    writer: &mut impl Write,
    config: &ModelConfig,
    len: Option<u64>,
) -> Result<u64> {
    if len == Some(0) {
        return Ok(0);
    }

    let framing = match len {
        Some(_) => Framing::Length,
        None => Framing::Sentinel,
    };
    let mut decompressor = Decompressor::<M>::new(config, stream, framing)?;
    let mut buffer = Vec::with_capacity(IO_BUFFER_SIZE);

    let mut pl = ProgressLogger::default();
    pl.item_name("byte")
        .expected_updates(len.map(|len| len as usize));
    pl.start("Decompressing...");

    loop {
        buffer.clear();
        match len {
            Some(len) => {
                let left = len - decompressor.bytes_out();
                if left == 0 {
                    break;
                }
                decompressor.decode_exact(left.min(IO_BUFFER_SIZE as u64) as usize, &mut buffer)?;
            }
            None => {
                while buffer.len() < IO_BUFFER_SIZE {
                    match decompressor.decode_byte()? {
                        Some(byte) => buffer.push(byte),
                        None => break,
                    }
                }
                if buffer.is_empty() {
                    break;
                }
            }
        }
        writer.write_all(&buffer).context("Could not write output")?;
        pl.update_with_count(buffer.len());
    }
    pl.done();

    Ok(decompressor.bytes_out())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_header_round_trip() {
        let config = ModelConfig {
            hashed_orders: vec![2, 6],
            hash_bits: 16,
            mixer: MixerKind::Logistic,
            xml_model: true,
            ..Default::default()
        };
        let archive = Archive::new(&config, 42, vec![1, 2, 3]);
        assert_eq!(archive.config().unwrap(), config);
    }

    #[test]
    fn test_bad_headers_are_rejected() {
        let config = ModelConfig::default();

        let mut archive = Archive::new(&config, 0, Vec::new());
        archive.magic ^= 1;
        assert!(matches!(archive.config(), Err(Error::InvalidArchive(_))));

        let mut archive = Archive::new(&config, 0, Vec::new());
        archive.version = VERSION + 1;
        assert!(matches!(archive.config(), Err(Error::InvalidArchive(_))));

        let mut archive = Archive::new(&config, 0, Vec::new());
        archive.flags = 0x80;
        assert!(matches!(archive.config(), Err(Error::InvalidArchive(_))));

        let mut archive = Archive::new(&config, 0, Vec::new());
        archive.mixer = 7;
        assert!(archive.config().is_err());
    }

    #[test]
    fn test_bits_per_byte() {
        let stats = Stats {
            original: 100,
            compressed: 25,
        };
        assert_eq!(stats.bits_per_byte(), 2.0);
        let empty = Stats {
            original: 0,
            compressed: 12,
        };
        assert_eq!(empty.bits_per_byte(), 0.0);
    }
}
