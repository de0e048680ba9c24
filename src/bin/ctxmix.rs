use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ctxmix::config::ModelArgs;
use ctxmix::{compress_file, decompress_file, ModelConfig};

#[derive(Parser, Debug)]
#[command(about = "Context-mixing compressor", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Raises the log verbosity; repeat for more.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compresses a file.
    Compress(FileArgs),
    /// Decompresses a file.
    Decompress(FileArgs),
}

#[derive(clap::Args, Debug)]
struct FileArgs {
    /// The file to read.
    input: PathBuf,

    /// The file to write.
    output: PathBuf,

    /// Reads or writes a bare stream, terminated by a zero byte and without header; the input
    /// of compression must not contain zero bytes and decompression needs the same model flags.
    #[clap(long)]
    raw: bool,

    /// Model flags, used to compress and to decompress raw streams.
    #[clap(flatten)]
    model_args: ModelArgs,
}

pub fn main() -> Result<()> {
    let args = Args::parse();

    stderrlog::new()
        .verbosity(2 + args.verbose as usize)
        .timestamp(stderrlog::Timestamp::Second)
        .init()
        .unwrap();

    match args.command {
        Command::Compress(file_args) => {
            let config = ModelConfig::from(file_args.model_args);
            compress_file(&file_args.input, &file_args.output, &config, file_args.raw)?;
        }
        Command::Decompress(file_args) => {
            let config = ModelConfig::from(file_args.model_args);
            decompress_file(&file_args.input, &file_args.output, &config, file_args.raw)?;
        }
    }

    Ok(())
}
