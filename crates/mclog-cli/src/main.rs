/// Motor-controller log decoder.
///
/// # Command overview
///
/// ```text
/// mclog <COMMAND> [OPTIONS]
///
/// Commands:
///   decode     Decode a log into CSV, PulseView and JSON outputs
///   inspect    Print the header blocks and record layout of a log
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log resynchronisation detail (debug level)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// Logging goes to stderr through `tracing`. `RUST_LOG` overrides the
/// default level (`info`, or `debug` with `--verbose`).
///
/// # Exit codes
///
/// | Code | Meaning                                         |
/// |------|-------------------------------------------------|
/// | 0    | Success, including logs with zero valid records |
/// | 1    | Error (unreadable input, fatal header problem)  |
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd_decode;
mod cmd_inspect;

// ── CLI root ──────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "mclog", version, about = "Motor-controller log decoder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level, including every resynchronisation skip.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Decode a log into the selected outputs.
    Decode(DecodeArgs),
    /// Print the header blocks and record layout of a log.
    Inspect(InspectArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `mclog decode`.
///
/// ```text
/// ┌──────┬──────────────────────────────────────────────────┐
/// │ Flag │ Output                                           │
/// ├──────┼──────────────────────────────────────────────────┤
/// │ -p   │ <dest>.sr       PulseView session (needs `zip`)  │
/// │ -c   │ <dest>_motor_data.csv                            │
/// │ -s   │ <dest>_spot_values.csv                           │
/// │ -j   │ <dest>.json     header blocks verbatim           │
/// │ -a   │ all of the above (also the default with no flag) │
/// └──────┴──────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct DecodeArgs {
    /// Binary log to decode.
    pub source: PathBuf,

    /// Base path for outputs. Defaults to the source without its extension.
    pub dest: Option<PathBuf>,

    /// Generate a PulseView file for motor data.
    #[arg(short = 'p')]
    pub pulseview: bool,

    /// Generate a CSV file for motor data.
    #[arg(short = 'c')]
    pub motor_csv: bool,

    /// Generate a CSV file for spot values.
    #[arg(short = 's')]
    pub spot_csv: bool,

    /// Write the header blocks to a JSON file.
    #[arg(short = 'j')]
    pub json: bool,

    /// Generate every output.
    #[arg(short = 'a')]
    pub all: bool,

    /// Archiver used to package the PulseView session.
    #[arg(long, default_value = "zip")]
    pub zip: String,
}

/// Arguments for `mclog inspect`.
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Binary log to inspect.
    pub source: PathBuf,

    /// Also scan every record and report sync statistics.
    #[arg(long)]
    pub scan: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Decode(args) => cmd_decode::run(&args),
        Commands::Inspect(args) => cmd_inspect::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
