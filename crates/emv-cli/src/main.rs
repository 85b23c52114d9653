use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use emv_card::{ScanPolicy, ScanStrategy};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod formatters;

use config::Config;
use formatters::FormatMode;

#[derive(Parser)]
#[command(name = "emv-dump")]
#[command(about = "EMV card dump - read and decode payment card records over PC/SC")]
#[command(version)]
struct Args {
    /// Output format mode
    #[arg(short, long, value_enum, global = true, default_value_t = FormatMode::Human)]
    format: FormatMode,

    /// TOML file with a [scan] table overriding the default scan policy
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Record scan strategy
    #[arg(long, value_enum, global = true)]
    strategy: Option<StrategyArg>,

    /// Do not follow 61xx status words with GET RESPONSE
    #[arg(long, global = true)]
    no_get_response: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available PC/SC readers
    Readers,
    /// Read the card once and print everything decoded
    Dump {
        /// Reader name (defaults to the first reader)
        #[arg(short, long)]
        reader: Option<String>,
    },
    /// Wait for cards and dump each new one
    Watch {
        /// Reader name (defaults to the first reader)
        #[arg(short, long)]
        reader: Option<String>,

        /// Polling interval in milliseconds
        #[arg(long, default_value_t = 250)]
        interval_ms: u64,
    },
    /// Decode an ATR given as hex
    Atr {
        /// ATR bytes, e.g. "3B 65 00 00 4A 43 4F 50 76"
        hex: String,
    },
    /// Decode a BER-TLV blob given as hex
    Parse {
        /// TLV bytes, e.g. "70 05 5F 24 03 24 01 01"
        hex: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Every SFI and record in the configured ranges
    BruteForce,
    /// Only the records listed by the Application File Locator
    Afl,
}

impl From<StrategyArg> for ScanStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::BruteForce => ScanStrategy::BruteForce,
            StrategyArg::Afl => ScanStrategy::Afl,
        }
    }
}

/// Config file first, then command-line overrides
fn scan_policy(args: &Args) -> Result<ScanPolicy> {
    let mut policy = match &args.config {
        Some(path) => Config::load(path)?.scan,
        None => ScanPolicy::default(),
    };

    if let Some(strategy) = args.strategy {
        policy.strategy = strategy.into();
    }
    if args.no_get_response {
        policy.follow_get_response = false;
    }

    policy.validate()?;
    Ok(policy)
}

fn main() -> Result<()> {
    // Set RUST_LOG=debug to see every APDU exchanged, RUST_LOG=trace for raw responses
    // Logs go to stderr so --format json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mode = args.format;

    match &args.command {
        Command::Readers => commands::readers::cmd_readers(),
        Command::Dump { reader } => {
            let policy = scan_policy(&args)?;
            commands::dump::cmd_dump(reader.as_deref(), &policy, mode)
        }
        Command::Watch {
            reader,
            interval_ms,
        } => {
            let policy = scan_policy(&args)?;
            commands::watch::cmd_watch(reader.clone(), *interval_ms, policy, mode)
        }
        Command::Atr { hex } => commands::atr::cmd_atr(hex, mode),
        Command::Parse { hex } => commands::parse::cmd_parse(hex, mode),
    }
}
