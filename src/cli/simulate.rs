//! Simulate command implementation.

// Game counts and durations only feed the throughput figure.
#![allow(clippy::cast_precision_loss)]

use super::output::{print_summaries, Source};
use super::{
    build_policies, configure_threads, load_table, progress_bar, resolve_seed, CliError, RulesArgs,
    SummaryFormat,
};
use clap::Args;
use shutbox::record::{write_scores, RunRecord, ScoreRow};
use shutbox::simulation::run_batch;
use shutbox::stats::summarize;
use shutbox::{SimulationConfig, Strategy};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the `simulate` command.
#[derive(Debug, Args)]
pub(crate) struct SimulateArgs {
    /// Strategies to compare, comma-separated (default: all built-in, plus
    /// table when --table is given)
    #[arg(short = 'S', long, value_delimiter = ',')]
    strategies: Vec<Strategy>,

    /// Games per strategy (default: 1000)
    #[arg(short, long, default_value = "1000")]
    games: u64,

    /// Starting seed (increments for each game)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Parallel threads (default: CPU count)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Policy table JSON for the table strategy
    #[arg(long)]
    table: Option<PathBuf>,

    /// Output format: text, json, or csv
    #[arg(short, long, default_value = "text")]
    format: SummaryFormat,

    /// Also write one score row per game to this CSV file
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Show progress bar
    #[arg(short, long)]
    progress: bool,

    #[command(flatten)]
    rules: RulesArgs,
}

/// Strategies to run when none were named.
fn default_strategies(with_table: bool) -> Vec<Strategy> {
    let mut strategies = Strategy::BUILTIN.to_vec();
    if with_table {
        strategies.push(Strategy::Table);
    }
    strategies
}

/// Execute the simulate command.
///
/// # Errors
///
/// Returns an error if the rules are invalid, the table cannot be loaded, a
/// policy misbehaves, or the score file cannot be written.
pub(crate) fn execute(args: SimulateArgs) -> Result<(), CliError> {
    let game = args.rules.game_config()?;
    let table = load_table(args.table.as_deref())?;

    let strategies = if args.strategies.is_empty() {
        default_strategies(table.is_some())
    } else {
        args.strategies
    };
    let policies = build_policies(&strategies, table.as_ref())?;

    configure_threads(args.threads);
    let seed = resolve_seed(args.seed);
    let config = SimulationConfig {
        games: args.games,
        seed,
        game,
        trace: false,
    };

    let total = args
        .games
        .saturating_mul(u64::try_from(policies.len()).unwrap_or(u64::MAX));
    let pb = progress_bar(total, args.progress);
    let start = Instant::now();

    // One batch per strategy; run ids continue across batches
    let mut records: Vec<RunRecord> = Vec::new();
    for (index, policy) in (0u64..).zip(&policies) {
        records.extend(run_batch(policy.as_ref(), &config, index * config.games)?);
        if let Some(pb) = &pb {
            pb.inc(config.games);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }
    let duration = start.elapsed();

    if let Some(path) = &args.scores {
        super::ensure_parent_dir(path)?;
        let file = File::create(path)
            .map_err(|e| CliError::new(format!("Failed to create {}: {e}", path.display())))?;
        write_scores(BufWriter::new(file), &records)?;
    }

    let rows: Vec<ScoreRow> = records.iter().map(RunRecord::score_row).collect();
    let summaries = summarize(&rows);
    print_summaries(&summaries, &Source::Simulation { games: args.games, seed }, args.format)?;

    if args.format == SummaryFormat::Text {
        let games_per_sec = if duration.as_secs_f64() > 0.0 {
            records.len() as f64 / duration.as_secs_f64()
        } else {
            0.0
        };
        println!();
        println!("Duration: {:.2}s ({:.0} games/sec)", duration.as_secs_f64(), games_per_sec);
    }

    Ok(())
}
