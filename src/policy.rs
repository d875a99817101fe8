//! Decision strategies that play the engine.
//!
//! A policy sees a copy of the board, the pending roll and the legal moves,
//! and picks one of those moves (or passes). Policies never touch the engine;
//! candidates are scored on board copies.

mod table;

pub use table::{learn_table, PolicyTable, TableError, TablePolicy};

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::game::{Board, Move};

/// A decision rule choosing among legal moves.
///
/// Implementations must return one of the moves in `legal` (or `None`); the
/// simulation harness treats anything else as a fatal defect. Any randomness
/// must come from `rng`, which the caller seeds.
pub trait Policy: Send + Sync {
    /// Strategy identifier used in records and summaries.
    fn name(&self) -> &str;

    /// Pick a move for `roll` on `board`.
    fn choose(&self, board: &Board, roll: u8, legal: &[Move], rng: &mut dyn RngCore)
        -> Option<Move>;
}

/// Uniformly random legal move.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        Strategy::Random.name()
    }

    fn choose(&self, _board: &Board, _roll: u8, legal: &[Move], rng: &mut dyn RngCore) -> Option<Move> {
        legal.choose(rng).cloned()
    }
}

/// Fewest tiles; ties go to the move holding the largest tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyMinTiles;

impl Policy for GreedyMinTiles {
    fn name(&self) -> &str {
        Strategy::GreedyMinTiles.name()
    }

    fn choose(&self, _board: &Board, _roll: u8, legal: &[Move], _rng: &mut dyn RngCore) -> Option<Move> {
        legal
            .iter()
            .min_by_key(|mv| (mv.len(), Reverse(mv.largest()), *mv))
            .cloned()
    }
}

/// Lowest board score after the move; ties go to fewer tiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinRemainingSum;

impl MinRemainingSum {
    /// The min-remaining-sum choice, shared as the fallback of other policies.
    #[must_use]
    pub fn pick(board: &Board, legal: &[Move]) -> Option<Move> {
        legal
            .iter()
            .min_by_key(|mv| (board.after(mv).score(), mv.len(), *mv))
            .cloned()
    }
}

impl Policy for MinRemainingSum {
    fn name(&self) -> &str {
        Strategy::MinRemaining.name()
    }

    fn choose(&self, board: &Board, _roll: u8, legal: &[Move], _rng: &mut dyn RngCore) -> Option<Move> {
        Self::pick(board, legal)
    }
}

/// Prefer closing several tiles at once, the way people tend to play.
///
/// Among multi-tile moves picks the lowest remaining sum; only when every
/// legal move is a single tile does it fall back to [`MinRemainingSum`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HumanLike;

impl Policy for HumanLike {
    fn name(&self) -> &str {
        Strategy::Human.name()
    }

    fn choose(&self, board: &Board, _roll: u8, legal: &[Move], _rng: &mut dyn RngCore) -> Option<Move> {
        legal
            .iter()
            .filter(|mv| mv.len() >= 2)
            .min_by_key(|mv| (board.after(mv).score(), *mv))
            .cloned()
            .or_else(|| MinRemainingSum::pick(board, legal))
    }
}

/// Names of the built-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// [`RandomPolicy`].
    Random,
    /// [`GreedyMinTiles`].
    GreedyMinTiles,
    /// [`MinRemainingSum`].
    MinRemaining,
    /// [`HumanLike`].
    Human,
    /// [`TablePolicy`].
    Table,
}

impl Strategy {
    /// Strategies that need no external data.
    pub const BUILTIN: [Strategy; 4] = [
        Strategy::Random,
        Strategy::GreedyMinTiles,
        Strategy::MinRemaining,
        Strategy::Human,
    ];

    /// Identifier used on the command line and in records.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::GreedyMinTiles => "greedy-min-tiles",
            Strategy::MinRemaining => "min-remaining",
            Strategy::Human => "human",
            Strategy::Table => "table",
        }
    }

    /// Build the policy for this strategy.
    ///
    /// Returns `None` for [`Strategy::Table`] when no table is supplied.
    #[must_use]
    pub fn policy(self, table: Option<&PolicyTable>) -> Option<Box<dyn Policy>> {
        match self {
            Strategy::Random => Some(Box::new(RandomPolicy)),
            Strategy::GreedyMinTiles => Some(Box::new(GreedyMinTiles)),
            Strategy::MinRemaining => Some(Box::new(MinRemainingSum)),
            Strategy::Human => Some(Box::new(HumanLike)),
            Strategy::Table => table.map(|t| Box::new(TablePolicy::new(t.clone())) as Box<dyn Policy>),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognized strategy name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStrategy(pub String);

impl fmt::Display for UnknownStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown strategy {:?} (expected random, greedy-min-tiles, min-remaining, human or table)",
            self.0
        )
    }
}

impl std::error::Error for UnknownStrategy {}

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::BUILTIN
            .into_iter()
            .chain([Strategy::Table])
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}
