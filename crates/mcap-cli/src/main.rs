/// MCAP command-line tool: retrieve, validate and inspect chunked robot
/// log streams.
///
/// # Command overview
///
/// ```text
/// mcap <COMMAND> [OPTIONS]
///
/// Commands:
///   retrieve   Print the messages of a time window as JSON lines
///   validate   Check a stream for protocol correctness
///   inspect    List the top-level records of a file
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log state transitions and chunk unpacking to stderr
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                         |
/// |------|-------------------------------------------------|
/// | 0    | Success                                         |
/// | 1    | Error (I/O failure, protocol violation, etc.)   |
///
/// Logs and error details go to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use mcap_stream::{StreamConfig, Time};
use tracing_subscriber::EnvFilter;

mod cmd_inspect;
mod cmd_retrieve;
mod cmd_validate;
mod input;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Time-windowed retrieval over MCAP-style robot log streams.
#[derive(Parser)]
#[command(name = "mcap", version, about = "Chunked robot log retrieval CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level. `RUST_LOG` takes precedence when set.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print every message in a time window as one JSON object per line.
    Retrieve(RetrieveArgs),
    /// Run a full retrieval and report whether the stream is well-formed.
    Validate(ValidateArgs),
    /// List each top-level record with its offset, kind and size.
    Inspect(InspectArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `mcap retrieve`.
///
/// ```text
/// ┌───────────────────┬────────────────────────────────────────────────┐
/// │ Flag              │ Effect                                         │
/// ├───────────────────┼────────────────────────────────────────────────┤
/// │ --start S         │ Earliest receive time, `sec[.fraction]`        │
/// │ --end S           │ Latest receive time, inclusive                 │
/// │ --topic T         │ Keep only topic T (repeatable)                 │
/// │ --read-chunk-size │ Bytes requested per read from the input        │
/// └───────────────────┴────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct RetrieveArgs {
    /// Input file, or `-` for stdin.
    pub file: PathBuf,

    /// Start of the window (defaults to the beginning of time).
    #[arg(long)]
    pub start: Option<Time>,

    /// End of the window (defaults to the end of time).
    #[arg(long)]
    pub end: Option<Time>,

    /// Topic to keep. May be given more than once; all topics when absent.
    #[arg(long = "topic")]
    pub topics: Vec<String>,

    /// Bytes requested per read from the input.
    #[arg(long, default_value_t = StreamConfig::default().read_chunk_size)]
    pub read_chunk_size: usize,
}

/// Arguments for `mcap validate`.
///
/// Runs a full retrieval with an all-time window and all topics, so every
/// in-window payload is decoded.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Input file, or `-` for stdin.
    pub file: PathBuf,
}

/// Arguments for `mcap inspect`.
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the file to inspect.
    pub file: PathBuf,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Retrieve(args) => cmd_retrieve::run(&args).await,
        Commands::Validate(args) => cmd_validate::run(&args).await,
        Commands::Inspect(args) => cmd_inspect::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
