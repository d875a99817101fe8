//! Lookup-table policy and the table builder.
//!
//! A table maps `"<board signature>|<roll>"` to a `+`-joined move, stored as
//! a flat JSON object:
//!
//! ```text
//! { "123456789|9": "4+5", "123XXXXX9|3": "1+2" }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use rand::RngCore;

use crate::game::{Board, Move};
use crate::policy::{MinRemainingSum, Policy, Strategy};
use crate::record::StepRecord;

/// Separator between signature and roll in a table key.
const KEY_SEPARATOR: char = '|';

/// Error loading, parsing or building a policy table.
#[derive(Debug)]
pub enum TableError {
    /// Reading or writing the table file failed.
    Io(io::Error),
    /// The file is not a JSON object of strings.
    Json(serde_json::Error),
    /// A key is not `<signature>|<roll>`.
    BadKey(String),
    /// A value is not a `+`-joined move.
    BadMove {
        /// Key the value belongs to.
        key: String,
        /// The offending value.
        text: String,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "policy table I/O failed: {e}"),
            Self::Json(e) => write!(f, "policy table is not valid JSON: {e}"),
            Self::BadKey(key) => write!(f, "bad policy table key {key:?} (expected <signature>|<roll>)"),
            Self::BadMove { key, text } => write!(f, "bad move {text:?} for policy table key {key:?}"),
        }
    }
}

impl std::error::Error for TableError {}

impl From<io::Error> for TableError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for TableError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

fn table_key(signature: &str, roll: u8) -> String {
    format!("{signature}{KEY_SEPARATOR}{roll}")
}

fn check_key(key: &str) -> Result<(), TableError> {
    let bad = || TableError::BadKey(key.to_string());
    let (signature, roll) = key.split_once(KEY_SEPARATOR).ok_or_else(bad)?;
    if signature.is_empty() || !signature.chars().all(Board::is_signature_char) {
        return Err(bad());
    }
    roll.parse::<u8>().map_err(|_| bad())?;
    Ok(())
}

/// Preferred move per `(board signature, roll)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyTable {
    entries: BTreeMap<String, Move>,
}

impl PolicyTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the preferred move for a signature and roll.
    pub fn insert(&mut self, signature: &str, roll: u8, mv: Move) {
        self.entries.insert(table_key(signature, roll), mv);
    }

    /// Preferred move for a signature and roll, if any.
    #[must_use]
    pub fn get(&self, signature: &str, roll: u8) -> Option<&Move> {
        self.entries.get(&table_key(signature, roll))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a table from JSON text. Every key and move is validated.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid JSON, a malformed key or a malformed move.
    pub fn from_json(text: &str) -> Result<Self, TableError> {
        let raw: BTreeMap<String, String> = serde_json::from_str(text)?;
        let mut entries = BTreeMap::new();
        for (key, text) in raw {
            check_key(&key)?;
            let mv = text.parse::<Move>().map_err(|_| TableError::BadMove {
                key: key.clone(),
                text: text.clone(),
            })?;
            entries.insert(key, mv);
        }
        Ok(Self { entries })
    }

    /// Render the table as pretty JSON with sorted keys.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, TableError> {
        let raw: BTreeMap<&str, String> = self
            .entries
            .iter()
            .map(|(key, mv)| (key.as_str(), mv.to_string()))
            .collect();
        Ok(serde_json::to_string_pretty(&raw)?)
    }

    /// Load a table file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Save the table to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file I/O fails.
    pub fn save(&self, path: &Path) -> Result<(), TableError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Follows a [`PolicyTable`], falling back to [`MinRemainingSum`] on a miss
/// or when the stored move is not legal for the current board.
#[derive(Debug, Clone)]
pub struct TablePolicy {
    table: PolicyTable,
}

impl TablePolicy {
    /// Wrap a table.
    #[must_use]
    pub const fn new(table: PolicyTable) -> Self {
        Self { table }
    }

    /// The wrapped table.
    #[must_use]
    pub const fn table(&self) -> &PolicyTable {
        &self.table
    }
}

impl Policy for TablePolicy {
    fn name(&self) -> &str {
        Strategy::Table.name()
    }

    fn choose(&self, board: &Board, roll: u8, legal: &[Move], _rng: &mut dyn RngCore) -> Option<Move> {
        if let Some(mv) = self.table.get(&board.signature(), roll)
            && legal.contains(mv)
        {
            return Some(mv.clone());
        }
        MinRemainingSum::pick(board, legal)
    }
}

/// Running score total for one (board, roll, move) group.
#[derive(Debug, Clone, Copy, Default)]
struct MoveScores {
    total: u64,
    count: u64,
}

impl MoveScores {
    /// Lower mean final score than `other`, compared without division.
    fn beats(self, other: Self) -> bool {
        u128::from(self.total) * u128::from(other.count)
            < u128::from(other.total) * u128::from(self.count)
    }
}

/// Build a table from traced steps.
///
/// Steps without a chosen move are skipped. Each (board, roll, move) group
/// with at least `min_count` samples is scored by the mean final score of the
/// runs it appeared in, and every (board, roll) keeps its lowest-scoring
/// move. Ties go to the move whose text sorts first.
///
/// # Errors
///
/// Returns [`TableError::BadMove`] for a chosen move that does not parse.
pub fn learn_table(steps: &[StepRecord], min_count: u64) -> Result<PolicyTable, TableError> {
    let mut groups: BTreeMap<(String, u8), BTreeMap<String, MoveScores>> = BTreeMap::new();
    for step in steps.iter().filter(|s| !s.chosen_move.is_empty()) {
        let scores = groups
            .entry((step.tiles_before.clone(), step.roll))
            .or_default()
            .entry(step.chosen_move.clone())
            .or_default();
        scores.total += u64::from(step.final_score);
        scores.count += 1;
    }

    let mut table = PolicyTable::new();
    for ((signature, roll), moves) in groups {
        let mut best: Option<(&String, MoveScores)> = None;
        for (text, &scores) in moves.iter().filter(|(_, s)| s.count >= min_count.max(1)) {
            if best.is_none_or(|(_, current)| scores.beats(current)) {
                best = Some((text, scores));
            }
        }
        if let Some((text, _)) = best {
            let key = table_key(&signature, roll);
            let mv = text.parse::<Move>().map_err(|_| TableError::BadMove {
                key,
                text: text.clone(),
            })?;
            table.insert(&signature, roll, mv);
        }
    }
    Ok(table)
}
