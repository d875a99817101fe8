//! Score distribution statistics per strategy.
//!
//! Lower scores are better: the score is the sum of the tiles left open.

// Sample counts and interpolation positions are small; the casts are exact.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use crate::record::{RecordError, ScoreRow};

/// Descriptive statistics of one strategy's final scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Strategy name.
    pub strategy: String,
    /// Number of games.
    pub runs: usize,
    /// Mean final score.
    pub mean: f64,
    /// Median final score.
    pub median: f64,
    /// Sample standard deviation (0 for a single game).
    pub std_dev: f64,
    /// Best (lowest) final score.
    pub min: u32,
    /// Worst (highest) final score.
    pub max: u32,
    /// 10th percentile.
    pub p10: f64,
    /// 25th percentile.
    pub p25: f64,
    /// 75th percentile.
    pub p75: f64,
    /// 90th percentile.
    pub p90: f64,
    /// Fraction of games that shut the box.
    pub shutout_rate: f64,
}

/// Quantile of sorted data by linear interpolation between closest ranks.
fn quantile(sorted: &[u32], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let lo_val = f64::from(sorted[lo]);
    lo_val + (f64::from(sorted[hi]) - lo_val) * (pos - lo as f64)
}

fn summarize_scores(strategy: &str, mut scores: Vec<u32>) -> Summary {
    scores.sort_unstable();
    let n = scores.len();
    let mean = scores.iter().map(|&s| f64::from(s)).sum::<f64>() / n as f64;
    let std_dev = if n > 1 {
        let sq_sum: f64 = scores.iter().map(|&s| (f64::from(s) - mean).powi(2)).sum();
        (sq_sum / (n - 1) as f64).sqrt()
    } else {
        0.0
    };
    let shutouts = scores.iter().take_while(|&&s| s == 0).count();

    Summary {
        strategy: strategy.to_string(),
        runs: n,
        mean,
        median: quantile(&scores, 0.5),
        std_dev,
        min: scores.first().copied().unwrap_or(0),
        max: scores.last().copied().unwrap_or(0),
        p10: quantile(&scores, 0.10),
        p25: quantile(&scores, 0.25),
        p75: quantile(&scores, 0.75),
        p90: quantile(&scores, 0.90),
        shutout_rate: shutouts as f64 / n as f64,
    }
}

/// Summarize scores per strategy, best (lowest mean) first.
///
/// Equal means are ordered by strategy name.
#[must_use]
pub fn summarize(rows: &[ScoreRow]) -> Vec<Summary> {
    let mut groups: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.strategy.as_str()).or_default().push(row.score);
    }

    let mut summaries: Vec<Summary> = groups
        .into_iter()
        .map(|(strategy, scores)| summarize_scores(strategy, scores))
        .collect();
    summaries.sort_by(|a, b| a.mean.total_cmp(&b.mean).then_with(|| a.strategy.cmp(&b.strategy)));
    summaries
}

/// The best-performing strategy: the one with the lowest mean score.
#[must_use]
pub fn best(summaries: &[Summary]) -> Option<&Summary> {
    summaries.iter().min_by(|a, b| a.mean.total_cmp(&b.mean))
}

/// Write summaries as CSV, one row per strategy.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_summaries<W: Write>(writer: W, summaries: &[Summary]) -> Result<(), RecordError> {
    let mut csv_out = csv::Writer::from_writer(writer);
    for summary in summaries {
        csv_out.serialize(summary)?;
    }
    csv_out.flush()?;
    Ok(())
}
