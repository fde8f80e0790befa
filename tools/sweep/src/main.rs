//! sweep - command-line driver for series-calc
//!
//! Evaluates single points, sweeps one function across an interval, or runs
//! a whole batch of sweeps from a configuration file.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use series_calc::DEFAULT_EPSILON;

#[derive(Parser)]
#[command(name = "sweep")]
#[command(about = "Series-based transcendental functions and domain sweeps")]
#[command(long_about = "Series-based transcendental functions and domain sweeps

Functions: sin, cos, tan, cot, sec, csc, ln, log2, log3, log5, system

Examples:
  sweep eval sin 0.5                              # Single value
  sweep sweep cot --start -1.5 --end 0 --step 0.01 -o cot.csv
  sweep batch --config sweeps.yaml                # Batch from configuration
  sweep batch --output-dir resources              # Reference batch")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one function at one point
    Eval {
        /// Function name (case-insensitive)
        function: String,

        /// Input value
        #[arg(allow_hyphen_values = true)]
        x: f64,

        /// Convergence tolerance
        #[arg(short, long, default_value_t = DEFAULT_EPSILON)]
        epsilon: f64,
    },

    /// Sweep one function across an interval
    Sweep {
        /// Function name (case-insensitive)
        function: String,

        /// First sample
        #[arg(long, allow_hyphen_values = true)]
        start: f64,

        /// Last sample (inclusive when reached exactly)
        #[arg(long, allow_hyphen_values = true)]
        end: f64,

        /// Distance between samples
        #[arg(long, allow_hyphen_values = true)]
        step: f64,

        /// Convergence tolerance
        #[arg(short, long, default_value_t = DEFAULT_EPSILON)]
        epsilon: f64,

        /// Field separator
        #[arg(short, long, default_value_t = ';')]
        separator: char,

        /// Decimal places for both fields
        #[arg(short, long, default_value_t = 3)]
        decimals: usize,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip failing samples instead of aborting
        #[arg(long)]
        skip_errors: bool,
    },

    /// Run a batch of sweeps
    Batch {
        /// Batch configuration (yaml, toml or json); the reference batch when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// List registered functions
    List,
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Initialize logging; records may go to stdout, so logs go to stderr
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Eval {
            function,
            x,
            epsilon,
        } => commands::eval(&function, x, epsilon, json),
        Commands::Sweep {
            function,
            start,
            end,
            step,
            epsilon,
            separator,
            decimals,
            output,
            skip_errors,
        } => commands::sweep(
            commands::SweepArgs {
                function,
                start,
                end,
                step,
                epsilon,
                separator,
                decimals,
                skip_errors,
            },
            output.as_deref(),
            json,
        ),
        Commands::Batch { config, output_dir } => {
            commands::batch(config.as_deref(), output_dir, json)
        },
        Commands::List => {
            commands::list(json);
            Ok(())
        },
    }
}
