//! Output formatting utilities for CLI.

use super::{CliError, SummaryFormat};
use serde::Serialize;
use shutbox::stats::{best, write_summaries, Summary};
use std::io;

/// How the summarized scores were produced.
#[derive(Debug, Clone)]
pub(super) enum Source {
    /// A fresh simulation.
    Simulation {
        /// Games per strategy.
        games: u64,
        /// Base seed.
        seed: u64,
    },
    /// A score file read from disk.
    File(String),
}

/// JSON-serializable summary report.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    /// Games per strategy (simulations only).
    games: Option<u64>,
    /// Base seed (simulations only).
    seed: Option<u64>,
    /// Score file (summaries of files only).
    source: Option<&'a str>,
    /// Lowest-mean strategy.
    best: Option<&'a str>,
    /// Per-strategy statistics, best first.
    strategies: &'a [Summary],
}

/// Format summaries as human-readable text.
pub(super) fn format_summary_text(summaries: &[Summary], source: &Source) -> String {
    let mut output = String::new();

    match source {
        Source::Simulation { games, seed } => {
            output.push_str(&format!("Strategy Results ({games} games each, seed {seed})\n"));
        }
        Source::File(path) => output.push_str(&format!("Strategy Results ({path})\n")),
    }
    output.push_str("========================================\n\n");

    output.push_str(&format!(
        "  {:<18} {:>7} {:>7} {:>7} {:>4} {:>4} {:>6} {:>6} {:>6} {:>6} {:>7}\n",
        "strategy", "mean", "median", "std", "min", "max", "p10", "p25", "p75", "p90", "shut"
    ));
    for s in summaries {
        output.push_str(&format!(
            "  {:<18} {:>7.2} {:>7.1} {:>7.2} {:>4} {:>4} {:>6.1} {:>6.1} {:>6.1} {:>6.1} {:>6.1}%\n",
            s.strategy,
            s.mean,
            s.median,
            s.std_dev,
            s.min,
            s.max,
            s.p10,
            s.p25,
            s.p75,
            s.p90,
            s.shutout_rate * 100.0
        ));
    }

    if let Some(top) = best(summaries) {
        output.push_str(&format!(
            "\nBest strategy: {} (mean score {:.2} over {} games)\n",
            top.strategy, top.mean, top.runs
        ));
    }

    output
}

/// Print summaries in the requested format.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub(super) fn print_summaries(summaries: &[Summary], source: &Source, format: SummaryFormat) -> Result<(), CliError> {
    match format {
        SummaryFormat::Text => print!("{}", format_summary_text(summaries, source)),
        SummaryFormat::Json => {
            let (games, seed, file) = match source {
                Source::Simulation { games, seed } => (Some(*games), Some(*seed), None),
                Source::File(path) => (None, None, Some(path.as_str())),
            };
            let report = JsonReport {
                games,
                seed,
                source: file,
                best: best(summaries).map(|s| s.strategy.as_str()),
                strategies: summaries,
            };
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        SummaryFormat::Csv => write_summaries(io::stdout().lock(), summaries)?,
    }
    Ok(())
}
