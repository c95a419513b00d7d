//! Static evaluation of Othello positions.

use othello_core::{Board, Move, Player, BOARD_SIZE};

/// Per-square desirability. Corners are prized; the squares diagonally
/// adjacent to a corner (X-squares) and next to it along an edge
/// (C-squares) hand the corner to the opponent and are penalised.
pub const POSITION_WEIGHTS: [[i32; BOARD_SIZE]; BOARD_SIZE] = [
    [100, -20, 10, 5, 5, 10, -20, 100],
    [-20, -50, -2, -2, -2, -2, -50, -20],
    [10, -2, 5, 1, 1, 5, -2, 10],
    [5, -2, 1, 0, 0, 1, -2, 5],
    [5, -2, 1, 0, 0, 1, -2, 5],
    [10, -2, 5, 1, 1, 5, -2, 10],
    [-20, -50, -2, -2, -2, -2, -50, -20],
    [100, -20, 10, 5, 5, 10, -20, 100],
];

const PIECE_FACTOR: i32 = 1;
const POSITION_FACTOR: i32 = 2;
const MOBILITY_FACTOR: i32 = 5;
const GREEDY_GAIN_FACTOR: i32 = 10;

pub fn weight(mv: Move) -> i32 {
    POSITION_WEIGHTS[mv.row()][mv.col()]
}

/// Sum of the weights of every square `player` occupies.
pub fn positional(board: &Board, player: Player) -> i32 {
    Move::all()
        .filter(|&mv| board.cell(mv) == player.cell())
        .map(weight)
        .sum()
}

/// Number of legal moves available to `player`.
pub fn mobility(board: &Board, player: Player) -> i32 {
    board.legal_moves(player).len() as i32
}

/// Evaluates `board` from `player`'s point of view; higher is better.
///
/// `piece difference + 2 * positional difference + 5 * mobility difference`
pub fn evaluate(board: &Board, player: Player) -> i32 {
    let opponent = player.opponent();
    let pieces = board.count(player) as i32 - board.count(opponent) as i32;
    let position = positional(board, player) - positional(board, opponent);
    let moves = mobility(board, player) - mobility(board, opponent);

    PIECE_FACTOR * pieces + POSITION_FACTOR * position + MOBILITY_FACTOR * moves
}

/// One-ply greedy score: ten points per piece gained plus the square weight.
/// `None` when the move is illegal.
pub fn greedy_score(board: &Board, mv: Move, player: Player) -> Option<i32> {
    let next = board.with_move(mv, player)?;
    let gained = next.count(player) as i32 - board.count(player) as i32;
    Some(GREEDY_GAIN_FACTOR * gained + weight(mv))
}
