//! Board representation and move encoding.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, ConfigResult, MoveParseError};

/// Largest supported board. Two dice never sum past 12, so a higher tile
/// could never be closed on its own.
pub const MAX_TILES: u8 = 12;

/// Standard board size.
pub const DEFAULT_TILES: u8 = 9;

/// Signature character for a closed tile.
pub const CLOSED_MARK: char = 'X';

/// Signature character for each open tile, indexed by `tile - 1`.
const TILE_MARKS: &[u8; MAX_TILES as usize] = b"123456789ABC";

#[inline]
const fn bit(tile: u8) -> u16 {
    1 << (tile - 1)
}

/// Open/closed state for tiles `1..=tiles_max`.
///
/// Stored as a bitmask (bit `tile - 1` set while the tile is open), so a
/// board is a small `Copy` value that policies can clone to score candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    tiles_max: u8,
    open: u16,
}

impl Board {
    /// Create a board with every tile open.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TileCount`] unless `1 <= tiles_max <= MAX_TILES`.
    pub fn new(tiles_max: u8) -> ConfigResult<Self> {
        if tiles_max == 0 || tiles_max > MAX_TILES {
            return Err(ConfigError::TileCount(tiles_max));
        }
        Ok(Self {
            tiles_max,
            open: (1u16 << tiles_max) - 1,
        })
    }

    /// Create a board where exactly `open` are open and the rest closed.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid size or a tile id not on the board.
    pub fn with_open(tiles_max: u8, open: &[u8]) -> ConfigResult<Self> {
        let mut board = Self::new(tiles_max)?;
        board.open = 0;
        for &tile in open {
            if !board.contains(tile) {
                return Err(ConfigError::UnknownTile { tile, tiles_max });
            }
            board.open |= bit(tile);
        }
        Ok(board)
    }

    /// Highest tile id on the board.
    #[must_use]
    pub const fn tiles_max(&self) -> u8 {
        self.tiles_max
    }

    /// Whether `tile` exists on this board.
    #[must_use]
    pub const fn contains(&self, tile: u8) -> bool {
        tile >= 1 && tile <= self.tiles_max
    }

    /// Whether `tile` exists and is still open.
    #[must_use]
    pub const fn is_open(&self, tile: u8) -> bool {
        self.contains(tile) && self.open & bit(tile) != 0
    }

    /// Open tile ids in ascending order.
    #[must_use]
    pub fn open_tiles(&self) -> Vec<u8> {
        self.iter().filter_map(|(tile, open)| open.then_some(tile)).collect()
    }

    /// Sum of the open tile ids.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.iter()
            .filter(|&(_, open)| open)
            .map(|(tile, _)| u32::from(tile))
            .sum()
    }

    /// True once every tile is closed.
    #[must_use]
    pub const fn is_shut(&self) -> bool {
        self.open == 0
    }

    /// `(tile, is_open)` pairs for every tile, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (u8, bool)> {
        let board = *self;
        (1..=board.tiles_max).map(move |tile| (tile, board.is_open(tile)))
    }

    /// The board as a tile id to open/closed map.
    #[must_use]
    pub fn tiles(&self) -> BTreeMap<u8, bool> {
        self.iter().collect()
    }

    /// A copy of this board with the tiles of `mv` closed.
    ///
    /// Tiles that are already closed or not on the board are ignored.
    #[must_use]
    pub fn after(&self, mv: &Move) -> Self {
        let mut next = *self;
        for &tile in mv.tiles() {
            next.close(tile);
        }
        next
    }

    /// Close a tile. Closed tiles stay closed.
    pub(crate) fn close(&mut self, tile: u8) {
        if self.contains(tile) {
            self.open &= !bit(tile);
        }
    }

    /// Fixed-width signature: the tile's mark when open, `X` when closed.
    ///
    /// A fresh nine-tile board is `123456789`; with 4 and 7 closed it is
    /// `123X56X89`.
    #[must_use]
    pub fn signature(&self) -> String {
        self.iter()
            .map(|(tile, open)| {
                if open {
                    char::from(TILE_MARKS[usize::from(tile - 1)])
                } else {
                    CLOSED_MARK
                }
            })
            .collect()
    }

    /// Whether `c` can appear in a board signature.
    #[must_use]
    pub fn is_signature_char(c: char) -> bool {
        c == CLOSED_MARK || u8::try_from(c).is_ok_and(|b| TILE_MARKS.contains(&b))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

/// A set of tiles to close, kept in ascending order.
///
/// Moves order lexicographically by their tile sequence, so `1+4 < 2+3 < 5`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Move(Vec<u8>);

impl Move {
    /// Build a move from tiles in any order.
    ///
    /// Duplicates are kept: a move naming a tile twice is never legal, and
    /// the engine should see it as offered.
    #[must_use]
    pub fn new(tiles: impl IntoIterator<Item = u8>) -> Self {
        let mut tiles: Vec<u8> = tiles.into_iter().collect();
        tiles.sort_unstable();
        Self(tiles)
    }

    /// Tiles in ascending order.
    #[must_use]
    pub fn tiles(&self) -> &[u8] {
        &self.0
    }

    /// Number of tiles closed by this move.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty move.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of the tile ids.
    #[must_use]
    pub fn sum(&self) -> u32 {
        self.0.iter().map(|&t| u32::from(t)).sum()
    }

    /// Highest tile in the move.
    #[must_use]
    pub fn largest(&self) -> Option<u8> {
        self.0.last().copied()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tile) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{tile}")?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = MoveParseError;

    /// Parse `+`-joined tile ids, e.g. `"8+3"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MoveParseError { text: s.to_string() };
        if s.trim().is_empty() {
            return Err(err());
        }
        let tiles = s
            .split('+')
            .map(|part| part.trim().parse::<u8>().map_err(|_| err()))
            .collect::<Result<Vec<_>, _>>()?;
        if tiles.contains(&0) {
            return Err(err());
        }
        Ok(Self::new(tiles))
    }
}
