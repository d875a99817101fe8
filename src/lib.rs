// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Shutbox: a Shut the Box engine with a strategy simulation harness.
//!
//! This crate provides:
//! - A rules engine that validates every move against the current roll
//! - Pluggable decision policies, including a table learned from traces
//! - Seeded, parallel batch simulation with per-step trace export
//! - Score aggregation for ranking strategies
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Stats / Table Builder (offline)   │
//! ├─────────────────────────────────────┤
//! │        Simulation Harness           │
//! ├─────────────────────────────────────┤
//! │     Policies       │    Records     │
//! ├─────────────────────────────────────┤
//! │         Game Engine                 │
//! └─────────────────────────────────────┘
//! ```
//!
//! Lower scores are better: a game's score is the sum of the tiles left open,
//! and a score of zero means the box was shut.

pub mod error;
pub mod game;
pub mod policy;
pub mod record;
pub mod simulation;
pub mod stats;

pub use error::{ConfigError, ConfigResult, MoveParseError, MoveRejection};

// Re-export key types at crate root for convenience
pub use game::{combos_that_sum, Board, DiceCount, Game, GameConfig, GameSnapshot, Move};
pub use policy::{Policy, PolicyTable, Strategy};
pub use record::{RunRecord, ScoreRow, StepRecord};
pub use simulation::{play_game, simulate, simulate_strategies, SimulationConfig, SimulationError};
pub use stats::{summarize, Summary};
