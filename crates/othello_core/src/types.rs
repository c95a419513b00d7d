//! Core value types shared by the engine, the server and the AI.
//!
//! Every type here is small and `Copy`. Wire representations follow the
//! protocol's integer encoding: `0` for an empty cell or a draw, `1` for
//! black and `2` for white.

use crate::error::RulesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of rows and columns on the board.
pub const BOARD_SIZE: usize = 8;

/// One of the two sides of a game.
///
/// Black always moves first and is assigned to the first session that
/// takes a seat in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Player {
    Black,
    White,
}

impl Player {
    /// Both players in seating order.
    pub const ALL: [Player; 2] = [Player::Black, Player::White];

    /// The other side.
    pub fn opponent(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Protocol id of this player (`1` or `2`).
    pub fn id(self) -> u8 {
        match self {
            Player::Black => 1,
            Player::White => 2,
        }
    }

    /// The cell value this player's pieces occupy.
    pub fn cell(self) -> Cell {
        match self {
            Player::Black => Cell::Black,
            Player::White => Cell::White,
        }
    }

    /// Lower-case label used in score maps.
    pub fn label(self) -> &'static str {
        match self {
            Player::Black => "black",
            Player::White => "white",
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> u8 {
        player.id()
    }
}

impl TryFrom<u8> for Player {
    type Error = RulesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Player::Black),
            2 => Ok(Player::White),
            other => Err(RulesError::InvalidPlayer(other)),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Contents of a single board square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Cell {
    #[default]
    Empty,
    Black,
    White,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> u8 {
        match cell {
            Cell::Empty => 0,
            Cell::Black => 1,
            Cell::White => 2,
        }
    }
}

impl TryFrom<u8> for Cell {
    type Error = RulesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Cell::Empty),
            1 => Ok(Cell::Black),
            2 => Ok(Cell::White),
            other => Err(RulesError::InvalidCell(other)),
        }
    }
}

/// A board coordinate that is guaranteed to lie on the board.
///
/// Serialized as a `[row, col]` pair to match the `valid_moves` array of
/// the game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "[usize; 2]", try_from = "[usize; 2]")]
pub struct Move {
    row: usize,
    col: usize,
}

impl Move {
    /// Creates a move, returning `None` when the coordinate is off the board.
    pub fn new(row: usize, col: usize) -> Option<Move> {
        (row < BOARD_SIZE && col < BOARD_SIZE).then_some(Move { row, col })
    }

    /// Creates a move from untrusted signed coordinates as they arrive on the wire.
    pub fn from_signed(row: i64, col: i64) -> Option<Move> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        Move::new(row, col)
    }

    pub fn row(self) -> usize {
        self.row
    }

    pub fn col(self) -> usize {
        self.col
    }

    /// All 64 squares in row-major order.
    pub fn all() -> impl Iterator<Item = Move> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Move { row, col }))
    }

    /// The square one step away in direction `(dr, dc)`, if still on the board.
    pub(crate) fn step(self, dr: isize, dc: isize) -> Option<Move> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Move::new(row, col)
    }
}

impl From<Move> for [usize; 2] {
    fn from(mv: Move) -> [usize; 2] {
        [mv.row, mv.col]
    }
}

impl TryFrom<[usize; 2]> for Move {
    type Error = RulesError;

    fn try_from([row, col]: [usize; 2]) -> Result<Self, Self::Error> {
        Move::new(row, col).ok_or(RulesError::OutOfBounds { row: row as i64, col: col as i64 })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Winner {
    Player(Player),
    Draw,
}

impl From<Winner> for u8 {
    fn from(winner: Winner) -> u8 {
        match winner {
            Winner::Player(player) => player.id(),
            Winner::Draw => 0,
        }
    }
}

impl TryFrom<u8> for Winner {
    type Error = RulesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Winner::Draw),
            other => Player::try_from(other).map(Winner::Player),
        }
    }
}
