//! Collect command implementation: play traced games and export every step.

use super::{
    build_policies, configure_threads, ensure_parent_dir, load_table, progress_bar, resolve_seed, CliError,
    RulesArgs,
};
use clap::Args;
use shutbox::record::write_steps;
use shutbox::{simulate, SimulationConfig, Strategy};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Arguments for the `collect` command.
#[derive(Debug, Args)]
pub(crate) struct CollectArgs {
    /// Number of games to trace (default: 1000)
    #[arg(short, long, default_value = "1000")]
    episodes: u64,

    /// Strategy to play (default: random)
    #[arg(short = 'S', long, default_value = "random")]
    strategy: Strategy,

    /// Starting seed (increments for each game)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Parallel threads (default: CPU count)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Policy table JSON for the table strategy
    #[arg(long)]
    table: Option<PathBuf>,

    /// Step CSV to write (parent directories are created)
    #[arg(short, long, default_value = "run_results/random_runs.csv")]
    out: PathBuf,

    /// Suppress progress and status output
    #[arg(short, long)]
    quiet: bool,

    #[command(flatten)]
    rules: RulesArgs,
}

/// Execute the collect command.
///
/// # Errors
///
/// Returns an error if the rules are invalid, the policy misbehaves, or the
/// output cannot be written.
pub(crate) fn execute(args: &CollectArgs) -> Result<(), CliError> {
    let game = args.rules.game_config()?;
    let table = load_table(args.table.as_deref())?;
    let policies = build_policies(&[args.strategy], table.as_ref())?;

    configure_threads(args.threads);
    let seed = resolve_seed(args.seed);
    let config = SimulationConfig {
        games: args.episodes,
        seed,
        game,
        trace: true,
    };

    let pb = progress_bar(args.episodes, !args.quiet);
    let mut records = Vec::new();
    for policy in &policies {
        records.extend(simulate(policy.as_ref(), &config)?);
    }
    if let Some(pb) = pb {
        pb.set_position(args.episodes);
        pb.finish_with_message("done");
    }

    ensure_parent_dir(&args.out)?;
    let file = File::create(&args.out)
        .map_err(|e| CliError::new(format!("Failed to create {}: {e}", args.out.display())))?;
    write_steps(BufWriter::new(file), &records)?;

    if !args.quiet {
        let steps: usize = records.iter().map(|r| r.steps.len()).sum();
        let shutouts = records.iter().filter(|r| r.is_shutout()).count();
        eprintln!(
            "Wrote {steps} steps from {} {} games (seed {seed}, {shutouts} shutouts) to {}",
            records.len(),
            args.strategy,
            args.out.display()
        );
    }

    Ok(())
}
