//! Immutable game snapshots as they travel over the wire.

use crate::board::Board;
use crate::types::{Move, Player, Winner};
use serde::{Deserialize, Serialize};

/// Piece counts per player, serialized as `{"black": n, "white": m}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    pub black: u32,
    pub white: u32,
}

impl Scores {
    pub fn get(&self, player: Player) -> u32 {
        match player {
            Player::Black => self.black,
            Player::White => self.white,
        }
    }

    /// The player with strictly more pieces, or a draw on equal counts.
    pub fn leader(&self) -> Winner {
        match self.black.cmp(&self.white) {
            std::cmp::Ordering::Greater => Winner::Player(Player::Black),
            std::cmp::Ordering::Less => Winner::Player(Player::White),
            std::cmp::Ordering::Equal => Winner::Draw,
        }
    }
}

/// A complete, self-contained picture of a game at one instant.
///
/// Snapshots are produced by [`Board::snapshot`] and never mutated
/// afterwards; both players of a room receive identical copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub current_player: Player,
    /// Legal moves for `current_player`, row-major
    pub valid_moves: Vec<Move>,
    pub scores: Scores,
    pub game_over: bool,
    /// `null` until the game is over
    pub winner: Option<Winner>,
}

impl GameState {
    /// Whether `player` is the side to move in a live game.
    pub fn is_turn_of(&self, player: Player) -> bool {
        !self.game_over && self.current_player == player
    }
}
