//! # QC Genesis Tool
//!
//! Inspects the default genesis embedded in this build.
//!
//! ## Commands
//!
//! - `qc-genesis dump` - write the decoded genesis JSON to stdout
//! - `qc-genesis check` - decode fully and report header, size and members
//!
//! Logs go to stderr. The filter comes from `QC_LOG_LEVEL` (default `info`).

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use qc_genesis::{open_genesis_stream, GenesisStream};

const READ_CHUNK: usize = 16 * 1024;

#[derive(Parser, Debug)]
#[command(name = "qc-genesis", about = "Inspect the embedded default genesis")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the decoded genesis JSON to stdout
    Dump,
    /// Decode the genesis and report what was found
    Check,
}

fn main() -> Result<()> {
    // Initialize logging
    let filter =
        EnvFilter::try_from_env("QC_LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Dump => dump(),
        Command::Check => check(),
    };

    if let Err(err) = &result {
        error!("embedded genesis data corrupted: {err:#}");
    }
    result
}

fn open() -> Result<GenesisStream> {
    open_genesis_stream().context("Failed to open embedded genesis")
}

fn dump() -> Result<()> {
    let mut stream = open()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        let n = stream
            .read_chunk(&mut buf)
            .context("Failed to decode embedded genesis")?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n]).context("Failed to write genesis")?;
    }
    out.flush().context("Failed to flush stdout")?;
    Ok(())
}

fn check() -> Result<()> {
    let mut stream = open()?;
    let header = stream.header().clone();
    let mut buf = vec![0u8; READ_CHUNK];
    let mut first = None;

    loop {
        let n = stream
            .read_chunk(&mut buf)
            .context("Failed to decode embedded genesis")?;
        if n == 0 {
            break;
        }
        first.get_or_insert(buf[0]);
    }

    info!(
        filename = ?header.filename_lossy(),
        mtime = header.modification_time,
        os = header.operating_system,
        members = stream.members(),
        bytes = stream.total_out(),
        "embedded genesis verified"
    );
    if first != Some(b'{') {
        anyhow::bail!("Decoded genesis does not start with a JSON object");
    }
    Ok(())
}
