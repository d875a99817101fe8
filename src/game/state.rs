//! Game state management.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, MoveRejection};
use crate::game::{combos_that_sum, Board, Move, DEFAULT_TILES};

/// Faces on each die.
pub const DIE_SIDES: u8 = 6;

/// Rule configuration for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of tiles; the board holds `1..=tiles_max`.
    pub tiles_max: u8,
    /// Allow a single die once every tile above six is closed.
    pub single_die_rule: bool,
    /// Use the single die automatically whenever it is allowed.
    ///
    /// When false, [`Game::roll`] always throws two dice and one die must be
    /// requested through [`Game::roll_dice`].
    pub auto_single_die: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tiles_max: DEFAULT_TILES,
            single_die_rule: true,
            auto_single_die: false,
        }
    }
}

impl GameConfig {
    /// Check the configuration without building a game.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TileCount`] for an unsupported board size.
    pub fn validate(&self) -> ConfigResult<()> {
        Board::new(self.tiles_max).map(|_| ())
    }
}

/// Number of dice to throw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiceCount {
    /// One die, 1-6.
    One,
    /// Two dice, 2-12.
    Two,
}

impl DiceCount {
    /// Dice thrown for this count.
    #[must_use]
    pub const fn dice(self) -> u8 {
        match self {
            DiceCount::One => 1,
            DiceCount::Two => 2,
        }
    }
}

/// Read-only view of a game for external inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    /// Highest tile id.
    pub tiles_max: u8,
    /// Whether the single-die rule is enabled.
    pub single_die_rule: bool,
    /// Tile id to open (`true`) or closed (`false`).
    pub tiles: BTreeMap<u8, bool>,
    /// Whether the game has ended.
    pub over: bool,
    /// Roll waiting for a move, if any.
    pub last_roll: Option<u8>,
    /// Open tiles, ascending.
    pub open_tiles: Vec<u8>,
    /// Sum of the open tiles.
    pub score: u32,
}

/// A single game of Shut the Box.
///
/// Moves through `AwaitingRoll -> AwaitingMove -> AwaitingRoll` until a roll
/// has no legal move or the box is shut; after that every roll and move is a
/// no-op. The score is always derived from the board.
///
/// The dice come from the injected `rng`, so seeding it fixes the game.
#[derive(Debug, Clone)]
pub struct Game<R = SmallRng> {
    config: GameConfig,
    board: Board,
    over: bool,
    last_roll: Option<u8>,
    rng: R,
}

impl Game<SmallRng> {
    /// Create a game whose dice are seeded from `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn seeded(config: GameConfig, seed: u64) -> ConfigResult<Self> {
        Self::new(config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Game<R> {
    /// Create a game with every tile open.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: GameConfig, rng: R) -> ConfigResult<Self> {
        let board = Board::new(config.tiles_max)?;
        Ok(Self {
            config,
            board,
            over: false,
            last_roll: None,
            rng,
        })
    }

    /// Create a game starting from an arbitrary board.
    ///
    /// A board that is already shut starts the game over.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the board size
    /// does not match it.
    pub fn from_board(config: GameConfig, board: Board, rng: R) -> ConfigResult<Self> {
        let mut game = Self::new(config, rng)?;
        if board.tiles_max() != config.tiles_max {
            return Err(ConfigError::BoardMismatch {
                expected: config.tiles_max,
                found: board.tiles_max(),
            });
        }
        game.board = board;
        game.over = board.is_shut();
        Ok(game)
    }

    /// Rule configuration.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Copy of the current board.
    #[must_use]
    pub const fn board(&self) -> Board {
        self.board
    }

    /// Whether the game has ended.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.over
    }

    /// Roll waiting for a move (or the roll that ended the game).
    #[must_use]
    pub const fn last_roll(&self) -> Option<u8> {
        self.last_roll
    }

    /// Open tiles, ascending.
    #[must_use]
    pub fn open_tiles(&self) -> Vec<u8> {
        self.board.open_tiles()
    }

    /// Sum of the open tiles; lower is better.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.board.score()
    }

    /// True when the rule is enabled and every tile above six is closed.
    #[must_use]
    pub fn can_use_single_die(&self) -> bool {
        self.config.single_die_rule
            && (DIE_SIDES + 1..=self.board.tiles_max()).all(|tile| !self.board.is_open(tile))
    }

    /// Legal moves for `target` on the current board.
    #[must_use]
    pub fn available_moves(&self, target: u8) -> Vec<Move> {
        combos_that_sum(&self.open_tiles(), target)
    }

    /// Roll with the configured default die count.
    ///
    /// Two dice, unless `auto_single_die` is set and one die is allowed.
    pub fn roll(&mut self) -> u8 {
        let dice = if self.config.auto_single_die && self.can_use_single_die() {
            DiceCount::One
        } else {
            DiceCount::Two
        };
        self.roll_dice(dice)
    }

    /// Roll a requested number of dice.
    ///
    /// A one-die request made while a single die is not allowed is ignored
    /// and two dice are thrown.
    pub fn roll_dice(&mut self, dice: DiceCount) -> u8 {
        if self.over {
            return self.last_roll.unwrap_or(0);
        }
        let dice = if dice == DiceCount::One && !self.can_use_single_die() {
            DiceCount::Two
        } else {
            dice
        };
        let value = (0..dice.dice())
            .map(|_| self.rng.gen_range(1..=DIE_SIDES))
            .sum();
        self.record_roll(value)
    }

    /// Use `value` as the roll without throwing dice.
    pub fn roll_forced(&mut self, value: u8) -> u8 {
        if self.over {
            return self.last_roll.unwrap_or(0);
        }
        self.record_roll(value)
    }

    fn record_roll(&mut self, value: u8) -> u8 {
        self.last_roll = Some(value);
        if self.available_moves(value).is_empty() {
            self.over = true;
        }
        value
    }

    /// Close `chosen` if it is a legal move for the pending roll.
    ///
    /// Tiles may be given in any order. On success the roll is consumed and
    /// the game ends if the box is shut.
    ///
    /// # Errors
    ///
    /// Returns a [`MoveRejection`] when the game is over, no roll is pending,
    /// or the tiles are not a legal move. The board is left untouched.
    pub fn apply_move(&mut self, chosen: impl IntoIterator<Item = u8>) -> Result<(), MoveRejection> {
        if self.over {
            return Err(MoveRejection::GameOver);
        }
        let Some(roll) = self.last_roll else {
            return Err(MoveRejection::NoPendingRoll);
        };

        let chosen = Move::new(chosen);
        if !self.available_moves(roll).contains(&chosen) {
            return Err(MoveRejection::NotLegal { roll, tiles: chosen });
        }

        for &tile in chosen.tiles() {
            self.board.close(tile);
        }
        self.last_roll = None;
        if self.board.is_shut() {
            self.over = true;
        }
        Ok(())
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> GameSnapshot {
        GameSnapshot {
            tiles_max: self.config.tiles_max,
            single_die_rule: self.config.single_die_rule,
            tiles: self.board.tiles(),
            over: self.over,
            last_roll: self.last_roll,
            open_tiles: self.open_tiles(),
            score: self.score(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_game(seed: u64) -> Game {
        Game::seeded(GameConfig::default(), seed).unwrap()
    }

    fn game_with_open(open: &[u8]) -> Game {
        let board = Board::with_open(9, open).unwrap();
        Game::from_board(GameConfig::default(), board, SmallRng::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let game = new_game(123);
        assert_eq!(game.open_tiles(), (1..=9).collect::<Vec<u8>>());
        assert_eq!(game.score(), 45);
        assert!(!game.is_over());
        assert_eq!(game.last_roll(), None);
    }

    #[test]
    fn test_invalid_config_refused() {
        let config = GameConfig {
            tiles_max: 0,
            ..GameConfig::default()
        };
        assert!(matches!(Game::seeded(config, 1), Err(ConfigError::TileCount(0))));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_board_mismatch_refused() {
        let board = Board::new(6).unwrap();
        let result = Game::from_board(GameConfig::default(), board, SmallRng::seed_from_u64(1));
        assert!(matches!(
            result,
            Err(ConfigError::BoardMismatch { expected: 9, found: 6 })
        ));
    }

    #[test]
    fn test_roll_either_has_moves_or_ends() {
        for seed in 0..50 {
            let mut game = new_game(seed);
            let roll = game.roll();
            assert!((2..=12).contains(&roll));
            assert_eq!(game.last_roll(), Some(roll));
            assert_eq!(game.is_over(), game.available_moves(roll).is_empty());
        }
    }

    #[test]
    fn test_move_without_roll_fails() {
        let mut game = new_game(1);
        assert_eq!(game.apply_move([1]), Err(MoveRejection::NoPendingRoll));
        assert_eq!(game.score(), 45);
    }

    #[test]
    fn test_illegal_move_rejected_and_roll_kept() {
        let mut game = new_game(2);
        let roll = game.roll_forced(5);
        assert_eq!(
            game.apply_move([9]),
            Err(MoveRejection::NotLegal {
                roll,
                tiles: Move::new([9])
            })
        );
        assert_eq!(game.last_roll(), Some(5));
        assert_eq!(game.score(), 45);
    }

    #[test]
    fn test_duplicate_tiles_rejected() {
        let mut game = new_game(2);
        game.roll_forced(8);
        assert!(game.apply_move([4, 4]).is_err());
        assert!(game.board().is_open(4));
    }

    #[test]
    fn test_legal_move_applies_and_clears_roll() {
        let mut game = new_game(3);
        game.roll_forced(7);
        assert!(game.apply_move([5, 2]).is_ok());
        assert_eq!(game.last_roll(), None);
        assert!(!game.board().is_open(2));
        assert!(!game.board().is_open(5));
        assert!(!game.is_over());
        assert_eq!(game.score(), 38);
    }

    #[test]
    fn test_scripted_path() {
        let mut game = new_game(0);
        game.roll_forced(9);
        assert!(game.apply_move([4, 5]).is_ok());
        game.roll_forced(8);
        assert!(game.apply_move([8]).is_ok());
        assert!(!game.can_use_single_die());
        game.roll_forced(7);
        assert!(game.apply_move([7]).is_ok());

        assert!(!game.can_use_single_die(), "tile 9 is still open");
        assert_eq!(game.open_tiles(), vec![1, 2, 3, 6, 9]);
        assert_eq!(game.score(), 21);

        game.roll_forced(9);
        assert!(game.apply_move([9]).is_ok());
        assert!(game.can_use_single_die());
        assert_eq!(game.open_tiles(), vec![1, 2, 3, 6]);
        assert_eq!(game.score(), 12);
    }

    #[test]
    fn test_single_die_after_high_tiles_closed() {
        let mut game = game_with_open(&[1, 2, 3, 4, 5, 6]);
        assert!(game.can_use_single_die());
        for _ in 0..20 {
            let mut probe = game.clone();
            let roll = probe.roll_dice(DiceCount::One);
            assert!((1..=6).contains(&roll));
        }
        let roll = game.roll_dice(DiceCount::Two);
        assert!((2..=12).contains(&roll));
    }

    #[test]
    fn test_single_die_request_ignored_when_not_allowed() {
        for seed in 0..30 {
            let mut game = new_game(seed);
            let roll = game.roll_dice(DiceCount::One);
            assert!((2..=12).contains(&roll));
        }
    }

    #[test]
    fn test_single_die_rule_disabled() {
        let config = GameConfig {
            single_die_rule: false,
            ..GameConfig::default()
        };
        let board = Board::with_open(9, &[1, 2]).unwrap();
        let game = Game::from_board(config, board, SmallRng::seed_from_u64(1)).unwrap();
        assert!(!game.can_use_single_die());
    }

    #[test]
    fn test_auto_single_die() {
        let config = GameConfig {
            auto_single_die: true,
            ..GameConfig::default()
        };
        let board = Board::with_open(9, &[1, 2, 3, 4, 5, 6]).unwrap();
        for seed in 0..20 {
            let mut game = Game::from_board(config, board, SmallRng::seed_from_u64(seed)).unwrap();
            let roll = game.roll();
            assert!((1..=6).contains(&roll));
        }
    }

    #[test]
    fn test_small_board_allows_single_die() {
        let config = GameConfig {
            tiles_max: 6,
            ..GameConfig::default()
        };
        let game = Game::seeded(config, 1).unwrap();
        assert!(game.can_use_single_die());
    }

    #[test]
    fn test_forced_roll_without_moves_ends_game() {
        let mut game = game_with_open(&[1, 9]);
        assert!(game.available_moves(3).is_empty());
        game.roll_forced(3);
        assert!(game.is_over());
        assert_eq!(game.score(), 10);

        // Game over is absorbing.
        assert_eq!(game.roll(), 3);
        assert_eq!(game.roll_forced(10), 3);
        assert_eq!(game.apply_move([1, 9]), Err(MoveRejection::GameOver));
        assert!(game.is_over());
        assert_eq!(game.last_roll(), Some(3));
        assert_eq!(game.open_tiles(), vec![1, 9]);
    }

    #[test]
    fn test_shutting_the_box_ends_game() {
        let mut game = game_with_open(&[2, 3]);
        game.roll_forced(5);
        assert!(game.apply_move([3, 2]).is_ok());
        assert!(game.is_over());
        assert_eq!(game.score(), 0);
        assert_eq!(game.last_roll(), None);
        assert_eq!(game.roll(), 0);
    }

    #[test]
    fn test_queries_are_idempotent() {
        let mut game = new_game(9);
        game.roll_forced(10);
        let first = (game.open_tiles(), game.score());
        let second = (game.open_tiles(), game.score());
        assert_eq!(first, second);
        assert_eq!(game.available_moves(10), game.available_moves(10));
    }

    #[test]
    fn test_same_seed_same_rolls() {
        let mut a = new_game(42);
        let mut b = new_game(42);
        assert_eq!(a.roll(), b.roll());
    }

    #[test]
    fn test_snapshot() {
        let mut game = game_with_open(&[1, 2, 6]);
        game.roll_forced(3);
        let state = game.state();
        assert_eq!(state.tiles_max, 9);
        assert_eq!(state.open_tiles, vec![1, 2, 6]);
        assert_eq!(state.score, 9);
        assert_eq!(state.last_roll, Some(3));
        assert!(!state.over);
        assert_eq!(state.tiles.get(&6), Some(&true));
        assert_eq!(state.tiles.get(&7), Some(&false));
        assert_eq!(state.tiles.len(), 9);
    }
}
