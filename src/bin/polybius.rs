//! Polybius CLI - seed-keyed Polybius square file cipher
//!
//! Encrypts a file into decimal coordinate text, or decrypts such text back
//! into bytes, using a square shuffled from the contents of a seed file.

use clap::Parser;
use std::error::Error as _;
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use polybius::file_ops;
use polybius::seed::{FileSeedSource, ReaderSeedSource, SeedSource};
use polybius::{CipherParams, DEFAULT_COORDINATE_SIZE, DEFAULT_DIMENSION, Mode, PolybiusError};

#[derive(Parser)]
#[command(name = "polybius")]
#[command(version)]
#[command(
    about = "Encryption and decryption of files with a seed-keyed Polybius square.",
    long_about = None
)]
struct Cli {
    /// Working mode: encrypt or decrypt
    #[arg(long, default_value = "encrypt")]
    mode: String,

    /// Input file path
    #[arg(long, value_name = "FILE", default_value = "input.txt")]
    input: PathBuf,

    /// Output file path
    #[arg(long, value_name = "FILE", default_value = "output.txt")]
    output: PathBuf,

    /// Seed file path for square generation, or `-` for stdin; used verbatim,
    /// nothing is trimmed
    #[arg(long, value_name = "FILE", default_value = "seed.txt")]
    seed_file: PathBuf,

    /// Number of rows and columns of the square
    #[arg(long, default_value_t = DEFAULT_DIMENSION)]
    dimension: usize,

    /// Number of digits per row or column field
    #[arg(long, default_value_t = DEFAULT_COORDINATE_SIZE)]
    coordinate_size: usize,
}

fn main() {
    // Quiet by default; `RUST_LOG` overrides. Logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", error_chain(&e));
        process::exit(1);
    }
}

fn run(cli: Cli) -> polybius::Result<()> {
    let mode: Mode = cli.mode.parse()?;
    let params = CipherParams {
        dimension: cli.dimension,
        coordinate_size: cli.coordinate_size,
    };
    debug!(%mode, ?params, "starting");

    let mut seed_source = get_seed_source(cli.seed_file);
    file_ops::run(mode, &cli.input, &cli.output, &mut *seed_source, &params)
}

fn get_seed_source(seed_file: PathBuf) -> Box<dyn SeedSource> {
    if seed_file.as_os_str() == "-" {
        Box::new(ReaderSeedSource::new(Box::new(std::io::stdin())))
    } else {
        Box::new(FileSeedSource::new(seed_file))
    }
}

/// Joins an error and all of its sources into one line.
fn error_chain(err: &PolybiusError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        out.push_str(": ");
        out.push_str(&inner.to_string());
        source = inner.source();
    }
    out
}
