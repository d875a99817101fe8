//! Shutbox CLI - Command-line interface for simulating Shut the Box strategies.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Shutbox - Shut the Box engine and strategy simulator
#[derive(Parser, Debug)]
#[command(name = "shutbox")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run many games per strategy and rank the strategies by mean score
    Simulate(cli::simulate::SimulateArgs),

    /// Play traced games and export every step as CSV
    Collect(cli::collect::CollectArgs),

    /// Summarize a score CSV written by `simulate --scores`
    Summarize {
        /// Score CSV (run_id, strategy, score)
        #[arg(required = true)]
        scores: PathBuf,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::SummaryFormat,
    },

    /// Build a policy table from a step CSV written by `collect`
    Learn {
        /// Step CSV to learn from
        #[arg(long = "in", default_value = "run_results/random_runs.csv")]
        input: PathBuf,

        /// Policy table JSON to write
        #[arg(long = "out", default_value = "run_results/policy_table.json")]
        output: PathBuf,

        /// Minimum samples for a (board, roll, move) group to count
        #[arg(long, default_value = "1")]
        min_count: u64,

        /// Suppress status output
        #[arg(short, long)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let result = match args.command {
        Commands::Simulate(simulate) => cli::simulate::execute(simulate),

        Commands::Collect(collect) => cli::collect::execute(&collect),

        Commands::Summarize { scores, format } => cli::summarize::execute(&scores, format),

        Commands::Learn {
            input,
            output,
            min_count,
            quiet,
        } => cli::learn::execute(&input, &output, min_count, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
