//! hexcopy - append hex dumps of payloads to a persistent sink.
//!
//! Drives one service session per invocation: open, do the work, release.

use anyhow::Context;
use clap::{Parser, Subcommand};
use hexcopy::{HexCopyService, ServiceConfig};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexcopy")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Append hexadecimal dumps of payloads to a sink file",
    long_about = "A single-session intake service that renders every payload as lines of eight hex byte pairs and appends them to a persistent sink."
)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sink file (overrides the configuration)
    #[arg(long, global = true)]
    sink: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a payload to the sink
    Write {
        /// Input file to dump
        #[arg(long, conflicts_with = "data")]
        input: Option<PathBuf>,

        /// String data to dump
        #[arg(long, conflicts_with = "input")]
        data: Option<String>,
    },

    /// Print the session status message
    Status {
        /// Bytes requested per read (default: 4096)
        #[arg(long, default_value = "4096")]
        chunk: usize,
    },

    /// Print the current sink contents
    Show,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ServiceConfig::default(),
    };
    if let Some(sink) = cli.sink {
        config.sink_path = sink;
    }

    match cli.command {
        Commands::Write { input, data } => cmd_write(config, input, data),
        Commands::Status { chunk } => cmd_status(config, chunk),
        Commands::Show => cmd_show(&config),
    }
}

fn cmd_write(
    config: ServiceConfig,
    input: Option<PathBuf>,
    data: Option<String>,
) -> anyhow::Result<()> {
    let content = match (input, data) {
        (Some(path), None) => {
            std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?
        }
        (None, Some(s)) => s.into_bytes(),
        (None, None) => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            buffer
        }
        (Some(_), Some(_)) => unreachable!(),
    };

    let service = HexCopyService::with_file_sink(config)?;
    service.open()?;
    let result = service.write(&content, content.len());
    service.release();

    let written = result?;
    println!(
        "Wrote {} bytes to {}",
        written,
        service.config().sink_path.display()
    );

    Ok(())
}

fn cmd_status(config: ServiceConfig, chunk: usize) -> anyhow::Result<()> {
    anyhow::ensure!(chunk > 0, "chunk must be greater than 0");

    let service = HexCopyService::with_file_sink(config)?;
    service.open()?;

    let mut stdout = io::stdout();
    loop {
        let bytes = service.read(chunk);
        if bytes.is_empty() {
            break;
        }
        stdout.write_all(&bytes)?;
    }
    service.release();

    Ok(())
}

fn cmd_show(config: &ServiceConfig) -> anyhow::Result<()> {
    let contents = std::fs::read(&config.sink_path)
        .with_context(|| format!("reading sink {}", config.sink_path.display()))?;
    io::stdout().write_all(&contents)?;
    Ok(())
}
