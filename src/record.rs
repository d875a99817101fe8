//! Per-game and per-step records produced by the simulation harness.
//!
//! Records are written as CSV with a header row. Field names and the `+`
//! (tiles within a move) and `;` (moves within a list) separators are stable;
//! downstream tooling depends on them.

use std::fmt;
use std::io::{self, Read, Write};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::game::Move;

/// Separator between moves in a list.
pub const MOVE_LIST_SEPARATOR: &str = ";";

/// One roll of a traced game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Run the step belongs to.
    pub episode: u64,
    /// Zero-based step index within the run.
    pub step: u32,
    /// Roll value.
    pub roll: u8,
    /// Board signature before the move.
    pub tiles_before: String,
    /// Legal moves for the roll, `+`-joined and `;`-separated.
    pub legal_moves: String,
    /// Chosen move, `+`-joined; empty when no move was made.
    pub chosen_move: String,
    /// Board signature after the move.
    pub tiles_after: String,
    /// Board score after the move.
    pub remaining_sum_after: u32,
    /// Whether the game ended on this step.
    pub terminal: bool,
    /// Final score of the run.
    pub final_score: u32,
}

/// One completed game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    /// Run identifier, unique within a batch.
    pub run_id: u64,
    /// Name of the strategy that played.
    pub strategy: String,
    /// Seed the game was played from.
    pub seed: u64,
    /// Final score (sum of tiles left open).
    pub score: u32,
    /// Step trace; empty unless tracing was requested.
    pub steps: Vec<StepRecord>,
}

impl RunRecord {
    /// True when every tile was closed.
    #[must_use]
    pub const fn is_shutout(&self) -> bool {
        self.score == 0
    }

    /// The run reduced to its score row.
    #[must_use]
    pub fn score_row(&self) -> ScoreRow {
        ScoreRow {
            run_id: self.run_id,
            strategy: self.strategy.clone(),
            score: self.score,
        }
    }
}

/// Final score of a run, as exported for strategy comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRow {
    /// Run identifier.
    pub run_id: u64,
    /// Strategy name.
    pub strategy: String,
    /// Final score.
    pub score: u32,
}

/// Error reading or writing records.
#[derive(Debug)]
pub enum RecordError {
    /// Underlying I/O failure.
    Io(io::Error),
    /// Malformed CSV or a field that does not fit its column.
    Csv(csv::Error),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "record I/O failed: {e}"),
            Self::Csv(e) => write!(f, "bad record CSV: {e}"),
        }
    }
}

impl std::error::Error for RecordError {}

impl From<io::Error> for RecordError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for RecordError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

/// Join moves as `1+4;2+3;5`.
#[must_use]
pub fn join_moves(moves: &[Move]) -> String {
    moves
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(MOVE_LIST_SEPARATOR)
}

/// Write the step traces of `records` as CSV.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_steps<W: Write>(writer: W, records: &[RunRecord]) -> Result<(), RecordError> {
    let mut csv_out = csv::Writer::from_writer(writer);
    for step in records.iter().flat_map(|r| &r.steps) {
        csv_out.serialize(step)?;
    }
    csv_out.flush()?;
    Ok(())
}

/// Write one score row per record as CSV.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_scores<W: Write>(writer: W, records: &[RunRecord]) -> Result<(), RecordError> {
    let mut csv_out = csv::Writer::from_writer(writer);
    for record in records {
        csv_out.serialize(record.score_row())?;
    }
    csv_out.flush()?;
    Ok(())
}

/// Read step rows written by [`write_steps`].
///
/// # Errors
///
/// Returns an error on I/O failure or a malformed row.
pub fn read_steps<R: Read>(reader: R) -> Result<Vec<StepRecord>, RecordError> {
    read_rows(reader)
}

/// Read score rows written by [`write_scores`].
///
/// # Errors
///
/// Returns an error on I/O failure or a malformed row.
pub fn read_scores<R: Read>(reader: R) -> Result<Vec<ScoreRow>, RecordError> {
    read_rows(reader)
}

fn read_rows<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>, RecordError> {
    let mut csv_in = csv::Reader::from_reader(reader);
    let rows = csv_in.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(rows)
}
