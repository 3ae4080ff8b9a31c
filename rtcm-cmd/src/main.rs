mod decode;
mod info;

use std::fs::File;
use std::io::{stderr, stdin, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show frame and message statistics for an RTCM 3 stream.
    Info {
        /// Input file, or - for stdin.
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: info::Format,
    },
    /// Decode an RTCM 3 stream, writing one JSON object per message to stdout.
    ///
    /// Messages that fail to decode are logged and skipped.
    Decode {
        /// Input file, or - for stdin.
        input: PathBuf,

        /// Only output these message types.
        #[arg(short, long, value_name = "csv", value_delimiter = ',')]
        types: Vec<u16>,

        /// Number of decode threads. The default is one per CPU.
        #[arg(long, default_value_t = 0)]
        threads: usize,
    },
}

fn open(input: &Path) -> Result<Box<dyn Read + Send>> {
    if input.as_os_str() == "-" {
        return Ok(Box::new(stdin()));
    }
    let file = File::open(input).with_context(|| format!("opening input {input:?}"))?;
    Ok(Box::new(file))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("RTCM3_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Info { input, format } => info::info(input, open(input)?, format),
        Commands::Decode {
            input,
            types,
            threads,
        } => decode::decode(open(input)?, types, *threads),
    }
}
