//! nbinom - negative binomial pseudorandom numbers from the command line
//!
//! # Commands
//!
//! - `nbinom sample -r <r> -p <p>` - Print draws, one per line
//! - `nbinom state -r <r> -p <p> --skip <n>` - Print a serialised generator
//! - `nbinom sample --record <file>` - Resume from a serialised generator
//! - `nbinom check` - Validate configuration and parameters
//!
//! Settings come from `--config <file>` (TOML), then `NBINOM_*` environment
//! variables, then command-line flags.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use config::{build_config, CliOverrides, LogLevel};

/// Negative binomial PRNG CLI
#[derive(Parser)]
#[command(name = "nbinom")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (same as `--log-level debug`)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (TOML)
    #[arg(short, long, global = true, env = "NBINOM_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Engine seed
    #[arg(short, long, global = true)]
    seed: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print negative binomial draws, one per line
    Sample {
        /// Number of successes until stopping
        #[arg(short)]
        r: Option<f64>,

        /// Success probability
        #[arg(short)]
        p: Option<f64>,

        /// Number of draws
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Serialised generator to resume from
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Print the serialised generator after skipping draws
    State {
        /// Number of successes until stopping
        #[arg(short)]
        r: Option<f64>,

        /// Success probability
        #[arg(short)]
        p: Option<f64>,

        /// Draws to consume before serialising
        #[arg(long, default_value = "0")]
        skip: usize,

        /// Output file; stdout when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate configuration and parameters
    Check {
        /// Number of successes until stopping
        #[arg(short)]
        r: Option<f64>,

        /// Success probability
        #[arg(short)]
        p: Option<f64>,
    },
}

fn init_tracing(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        log_level: if cli.verbose {
            Some(LogLevel::Debug)
        } else {
            cli.log_level
        },
        seed: cli.seed,
    };
    let config = build_config(cli.config.as_deref(), &overrides)?;

    init_tracing(config.log_level);
    info!(log_level = %config.log_level, seed = ?config.seed, "Configuration loaded");

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Commands::Sample {
            r,
            p,
            count,
            record,
        } => commands::sample::run(&config, r, p, count, record.as_deref(), &mut stdout),
        Commands::State {
            r,
            p,
            skip,
            output,
        } => commands::state::run(&config, r, p, skip, output.as_deref(), &mut stdout),
        Commands::Check { r, p } => commands::check::run(&config, r, p, &mut stdout),
    }
}
