//! Error types for the rule engine.

use std::fmt;

use crate::game::Move;

/// Invalid game configuration, rejected at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Tile count outside `1..=MAX_TILES`.
    TileCount(u8),
    /// A tile id that does not exist on the board.
    UnknownTile {
        /// The offending tile id.
        tile: u8,
        /// Highest tile id on the board.
        tiles_max: u8,
    },
    /// A starting board whose size disagrees with the configuration.
    BoardMismatch {
        /// Tile count from the configuration.
        expected: u8,
        /// Tile count of the supplied board.
        found: u8,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TileCount(n) => {
                write!(f, "invalid tile count {n} (expected 1..={})", crate::game::MAX_TILES)
            }
            ConfigError::UnknownTile { tile, tiles_max } => {
                write!(f, "tile {tile} is not on a 1..={tiles_max} board")
            }
            ConfigError::BoardMismatch { expected, found } => {
                write!(f, "board has {found} tiles but the game is configured for {expected}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Why the engine refused a move.
///
/// Rejections are ordinary values: probing legality is a normal thing for a
/// caller to do, and the board is never touched when a move is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveRejection {
    /// The game has already ended.
    GameOver,
    /// No roll is waiting for a move.
    NoPendingRoll,
    /// The tiles are not a legal move for the pending roll.
    NotLegal {
        /// The pending roll.
        roll: u8,
        /// The normalized tiles that were offered.
        tiles: Move,
    },
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveRejection::GameOver => write!(f, "game is over"),
            MoveRejection::NoPendingRoll => write!(f, "no roll is pending"),
            MoveRejection::NotLegal { roll, tiles } => {
                write!(f, "{tiles} is not a legal move for roll {roll}")
            }
        }
    }
}

impl std::error::Error for MoveRejection {}

/// A move string that could not be parsed (expected `+`-joined tile ids).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveParseError {
    /// The text that failed to parse.
    pub text: String,
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed move {:?}", self.text)
    }
}

impl std::error::Error for MoveParseError {}

/// Result type for engine construction.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::TileCount(0);
        assert!(format!("{err}").contains("invalid tile count 0"));

        let err = ConfigError::UnknownTile { tile: 11, tiles_max: 9 };
        assert!(format!("{err}").contains("tile 11"));
    }

    #[test]
    fn test_move_rejection_display() {
        let err = MoveRejection::NotLegal {
            roll: 5,
            tiles: Move::new([2, 4]),
        };
        assert_eq!(format!("{err}"), "2+4 is not a legal move for roll 5");
        assert_eq!(format!("{}", MoveRejection::NoPendingRoll), "no roll is pending");
    }
}
