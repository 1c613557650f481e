//! HEXBOTS CLI - Command-line interface
//!
//! Commands:
//! - play: Run a single match between robot scripts
//! - batch: Run many matches and report win rates
//! - check: Load scripts and report interpreter diagnostics

mod batch_cmd;
mod check_cmd;
mod play_cmd;
mod source;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexbots")]
#[command(about = "HEXBOTS hex-grid skirmish with scripted robots")]
struct Cli {
    /// Random seed for the interpreters
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single match
    Play(play_cmd::PlayArgs),
    /// Play a batch of matches
    Batch(batch_cmd::BatchArgs),
    /// Check robot scripts for errors
    Check(check_cmd::CheckArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Batch(args) => batch_cmd::run(args, cli.seed),
        Commands::Check(args) => check_cmd::run(args, cli.seed),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
