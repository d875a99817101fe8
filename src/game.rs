//! Game layer for shutbox.
//!
//! Implements the rules of Shut the Box:
//! - Board of numbered tiles, each open or closed
//! - Enumeration of tile subsets summing to a roll
//! - Roll and move transitions with terminal detection

mod board;
mod combos;
mod state;

pub use board::{Board, Move, CLOSED_MARK, DEFAULT_TILES, MAX_TILES};
pub use combos::combos_that_sum;
pub use state::{DiceCount, Game, GameConfig, GameSnapshot, DIE_SIDES};
