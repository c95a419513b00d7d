//! The Othello rules engine.
//!
//! [`Board`] is a plain 8x8 value type. It answers questions about a
//! position (legal moves, scores, termination) and applies moves, but it
//! never manages turns: deciding who moves next, including the pass rule,
//! is the caller's job.

use crate::error::RulesError;
use crate::state::{GameState, Scores};
use crate::types::{Cell, Move, Player, Winner, BOARD_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight ray directions as `(row delta, col delta)`.
const DIRECTIONS: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// An 8x8 Othello position.
///
/// The board is 64 bytes and `Copy`, so search code simulates moves on
/// copies instead of mutating and reverting a shared board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Standard starting position: white on (3,3) and (4,4), black on
    /// (3,4) and (4,3).
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.cells[3][3] = Cell::White;
        board.cells[4][4] = Cell::White;
        board.cells[3][4] = Cell::Black;
        board.cells[4][3] = Cell::Black;
        board
    }

    /// A board with no pieces at all.
    pub fn empty() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Builds a board from the wire encoding (`0`, `1`, `2` per cell).
    pub fn from_rows(rows: [[u8; BOARD_SIZE]; BOARD_SIZE]) -> Result<Self, RulesError> {
        let mut board = Self::empty();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                board.cells[r][c] = Cell::try_from(*value)?;
            }
        }
        Ok(board)
    }

    /// Builds a board from an 8-line text diagram.
    ///
    /// `.` is empty, `B`/`X` is black and `W`/`O` is white. Whitespace
    /// inside a line is ignored, which keeps test fixtures readable.
    pub fn from_diagram(diagram: &str) -> Result<Self, RulesError> {
        let mut board = Self::empty();
        let lines: Vec<&str> = diagram
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.len() != BOARD_SIZE {
            return Err(RulesError::OutOfBounds { row: lines.len() as i64, col: 0 });
        }
        for (r, line) in lines.iter().enumerate() {
            let symbols: Vec<u8> = line.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
            if symbols.len() != BOARD_SIZE {
                return Err(RulesError::OutOfBounds { row: r as i64, col: symbols.len() as i64 });
            }
            for (c, symbol) in symbols.into_iter().enumerate() {
                board.cells[r][c] = match symbol {
                    b'.' => Cell::Empty,
                    b'B' | b'X' => Cell::Black,
                    b'W' | b'O' => Cell::White,
                    other => return Err(RulesError::InvalidCell(other)),
                };
            }
        }
        Ok(board)
    }

    /// The wire encoding of the board, one row per inner array.
    pub fn rows(&self) -> [[u8; BOARD_SIZE]; BOARD_SIZE] {
        self.cells.map(|row| row.map(u8::from))
    }

    pub fn cell(&self, mv: Move) -> Cell {
        self.cells[mv.row()][mv.col()]
    }

    /// Overwrites a square without any rules check. Intended for fixtures.
    pub fn set_cell(&mut self, mv: Move, cell: Cell) {
        self.cells[mv.row()][mv.col()] = cell;
    }

    /// Length of the opposing run sandwiched by `player` when playing at
    /// `origin` along `(dr, dc)`; zero when the ray is not a sandwich.
    fn run_length(&self, origin: Move, dr: isize, dc: isize, player: Player) -> usize {
        let own = player.cell();
        let opposing = player.opponent().cell();
        let mut run = 0;
        let mut cursor = origin.step(dr, dc);

        while let Some(square) = cursor {
            match self.cell(square) {
                cell if cell == opposing => run += 1,
                cell if cell == own => return run,
                _ => return 0,
            }
            cursor = square.step(dr, dc);
        }
        0
    }

    /// Every opposing square that playing `mv` would flip, or an empty list
    /// when the move is illegal.
    pub fn flips(&self, mv: Move, player: Player) -> Vec<Move> {
        if !self.cell(mv).is_empty() {
            return Vec::new();
        }

        let mut flipped = Vec::new();
        for (dr, dc) in DIRECTIONS {
            let run = self.run_length(mv, dr, dc, player);
            let mut cursor = mv;
            for _ in 0..run {
                // run_length already walked these squares
                if let Some(next) = cursor.step(dr, dc) {
                    flipped.push(next);
                    cursor = next;
                }
            }
        }
        flipped
    }

    /// Whether `player` may play `mv`: the square is empty and at least one
    /// direction sandwiches an opposing run.
    pub fn is_legal(&self, mv: Move, player: Player) -> bool {
        self.cell(mv).is_empty()
            && DIRECTIONS
                .iter()
                .any(|&(dr, dc)| self.run_length(mv, dr, dc, player) > 0)
    }

    /// All legal moves for `player` in row-major order.
    pub fn legal_moves(&self, player: Player) -> Vec<Move> {
        Move::all().filter(|&mv| self.is_legal(mv, player)).collect()
    }

    pub fn has_legal_move(&self, player: Player) -> bool {
        Move::all().any(|mv| self.is_legal(mv, player))
    }

    /// Plays `mv` for `player`, returning the number of flipped pieces.
    ///
    /// On error the board is left untouched. On success at least one piece
    /// has been flipped.
    pub fn apply_move(&mut self, mv: Move, player: Player) -> Result<usize, RulesError> {
        if !self.cell(mv).is_empty() {
            return Err(RulesError::Occupied(mv));
        }

        let flipped = self.flips(mv, player);
        if flipped.is_empty() {
            return Err(RulesError::NoFlips(mv));
        }

        self.set_cell(mv, player.cell());
        for square in &flipped {
            self.set_cell(*square, player.cell());
        }
        Ok(flipped.len())
    }

    /// The position after `player` plays `mv`, leaving `self` unchanged.
    pub fn with_move(&self, mv: Move, player: Player) -> Option<Board> {
        let mut next = *self;
        next.apply_move(mv, player).ok().map(|_| next)
    }

    /// Number of squares holding `player`'s pieces.
    pub fn count(&self, player: Player) -> u32 {
        let own = player.cell();
        self.cells.iter().flatten().filter(|&&cell| cell == own).count() as u32
    }

    pub fn empty_count(&self) -> u32 {
        self.cells.iter().flatten().filter(|cell| cell.is_empty()).count() as u32
    }

    pub fn scores(&self) -> Scores {
        Scores {
            black: self.count(Player::Black),
            white: self.count(Player::White),
        }
    }

    /// True when neither player has a legal move.
    pub fn is_terminal(&self) -> bool {
        !self.has_legal_move(Player::Black) && !self.has_legal_move(Player::White)
    }

    /// The result of the game, or `None` while either side can still move.
    pub fn winner(&self) -> Option<Winner> {
        self.is_terminal().then(|| self.scores().leader())
    }

    /// An immutable snapshot of the position with `current` to move.
    pub fn snapshot(&self, current: Player) -> GameState {
        let winner = self.winner();
        GameState {
            board: *self,
            current_player: current,
            valid_moves: self.legal_moves(current),
            scores: self.scores(),
            game_over: winner.is_some(),
            winner,
        }
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: String = row
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => '.',
                    Cell::Black => 'B',
                    Cell::White => 'W',
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(row: usize, col: usize) -> Move {
        Move::new(row, col).unwrap()
    }

    #[test]
    fn test_initial_layout() {
        let board = Board::new();
        assert_eq!(board.cell(mv(3, 3)), Cell::White);
        assert_eq!(board.cell(mv(4, 4)), Cell::White);
        assert_eq!(board.cell(mv(3, 4)), Cell::Black);
        assert_eq!(board.cell(mv(4, 3)), Cell::Black);
        assert_eq!(board.empty_count(), 60);
        assert_eq!(board.scores(), Scores { black: 2, white: 2 });
    }

    #[test]
    fn test_black_opening_moves() {
        let board = Board::new();
        assert_eq!(
            board.legal_moves(Player::Black),
            vec![mv(2, 3), mv(3, 2), mv(4, 5), mv(5, 4)]
        );
        assert_eq!(
            board.legal_moves(Player::White),
            vec![mv(2, 4), mv(3, 5), mv(4, 2), mv(5, 3)]
        );
    }

    #[test]
    fn test_opening_move_flips_single_piece() {
        let mut board = Board::new();
        let flipped = board.apply_move(mv(2, 3), Player::Black).unwrap();
        assert_eq!(flipped, 1);
        assert_eq!(board.cell(mv(2, 3)), Cell::Black);
        assert_eq!(board.cell(mv(3, 3)), Cell::Black);
        assert_eq!(board.cell(mv(4, 4)), Cell::White);
        assert_eq!(board.scores(), Scores { black: 4, white: 1 });
    }

    #[test]
    fn test_rejected_moves_leave_board_untouched() {
        let mut board = Board::new();
        let before = board;

        assert_eq!(
            board.apply_move(mv(3, 3), Player::Black),
            Err(RulesError::Occupied(mv(3, 3)))
        );
        assert_eq!(
            board.apply_move(mv(0, 0), Player::Black),
            Err(RulesError::NoFlips(mv(0, 0)))
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_flips_runs_in_multiple_directions() {
        let board = Board::from_diagram(
            "
            . . . . . . . .
            . B . B . B . .
            . . W W W . . .
            . B W . W B . .
            . . W W W . . .
            . B . B . B . .
            . . . . . . . .
            . . . . . . . .
            ",
        )
        .unwrap();

        let mut played = board;
        let flipped = played.apply_move(mv(3, 3), Player::Black).unwrap();
        assert_eq!(flipped, 8);
        assert_eq!(played.count(Player::White), 0);
        assert_eq!(played.count(Player::Black), board.count(Player::Black) + 9);
    }

    #[test]
    fn test_run_must_be_closed_by_own_piece() {
        let board = Board::from_diagram(
            "
            W W W . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            ",
        )
        .unwrap();
        // a run of white that runs off the board is not a sandwich
        assert!(board.legal_moves(Player::Black).is_empty());
    }

    #[test]
    fn test_every_legal_move_applies_and_flips() {
        let mut board = Board::new();
        let mut player = Player::Black;

        // play a deterministic game to the end, checking invariants each ply
        for _ in 0..128 {
            let moves = board.legal_moves(player);
            for candidate in &moves {
                assert!(board.cell(*candidate).is_empty());
                let mut copy = board;
                let before = copy.count(player);
                let flipped = copy.apply_move(*candidate, player).unwrap();
                assert!(flipped >= 1);
                assert_eq!(copy.count(player), before + flipped as u32 + 1);
            }

            if let Some(choice) = moves.get(moves.len() / 2) {
                board.apply_move(*choice, player).unwrap();
                player = player.opponent();
            } else if board.has_legal_move(player.opponent()) {
                player = player.opponent();
            } else {
                break;
            }
        }

        assert!(board.is_terminal());
        assert!(board.legal_moves(Player::Black).is_empty());
        assert!(board.legal_moves(Player::White).is_empty());
    }

    #[test]
    fn test_terminal_position_reports_winner() {
        let mut rows = [[1u8; 8]; 8];
        rows[0][1] = 2;
        rows[7][7] = 0;
        let board = Board::from_rows(rows).unwrap();

        // no ray from the only empty square reaches the white piece
        assert!(board.is_terminal());
        assert_eq!(board.winner(), Some(Winner::Player(Player::Black)));

        let state = board.snapshot(Player::White);
        assert!(state.game_over);
        assert!(state.valid_moves.is_empty());
        assert_eq!(state.winner, Some(Winner::Player(Player::Black)));
    }

    #[test]
    fn test_terminal_position_with_equal_counts_is_draw() {
        let mut rows = [[0u8; 8]; 8];
        for (r, row) in rows.iter_mut().enumerate() {
            for cell in row.iter_mut() {
                *cell = if r < 4 { 1 } else { 2 };
            }
        }
        let board = Board::from_rows(rows).unwrap();

        assert!(board.is_terminal());
        assert_eq!(board.winner(), Some(Winner::Draw));
        assert_eq!(board.snapshot(Player::Black).winner, Some(Winner::Draw));
    }

    #[test]
    fn test_non_terminal_has_no_winner() {
        let board = Board::new();
        assert!(!board.is_terminal());
        assert_eq!(board.winner(), None);
        assert!(!board.snapshot(Player::Black).game_over);
    }

    #[test]
    fn test_with_move_does_not_mutate() {
        let board = Board::new();
        let next = board.with_move(mv(2, 3), Player::Black).unwrap();
        assert_eq!(board, Board::new());
        assert_ne!(next, board);
        assert!(board.with_move(mv(0, 0), Player::Black).is_none());
    }

    #[test]
    fn test_from_rows_rejects_bad_cells() {
        let mut rows = [[0u8; 8]; 8];
        rows[1][1] = 7;
        assert_eq!(Board::from_rows(rows), Err(RulesError::InvalidCell(7)));
    }

    #[test]
    fn test_serializes_as_integer_grid() {
        let json = serde_json::to_value(Board::new()).unwrap();
        assert_eq!(json[3][3], 2);
        assert_eq!(json[3][4], 1);
        assert_eq!(json[0][0], 0);

        let back: Board = serde_json::from_value(json).unwrap();
        assert_eq!(back, Board::new());
    }
}
