//! Move selection: random, greedy and minimax with alpha-beta pruning.

use crate::heuristic::{evaluate, greedy_score};
use crate::strategy::{clamp_depth, Strategy};
use othello_core::{Board, Move, Player};
use rand::seq::SliceRandom;
use rand::Rng;

/// Picks a move for `player` from `legal_moves`.
///
/// # Arguments
///
/// * `board` - Position to move from
/// * `player` - Side to move
/// * `legal_moves` - The legal moves for `player`, in row-major order
/// * `strategy` - Selection strategy
/// * `depth` - Minimax search depth in plies, clamped to `1..=MAX_SEARCH_DEPTH`
/// * `rng` - Randomness source for [`Strategy::Random`]
///
/// # Returns
///
/// `None` only when `legal_moves` is empty. Ties are broken in favour of
/// the move listed first.
pub fn choose_move<R: Rng + ?Sized>(
    board: &Board,
    player: Player,
    legal_moves: &[Move],
    strategy: Strategy,
    depth: u32,
    rng: &mut R,
) -> Option<Move> {
    match strategy {
        Strategy::Random => legal_moves.choose(rng).copied(),
        Strategy::Greedy => greedy_move(board, player, legal_moves),
        Strategy::Minimax => minimax_move(board, player, legal_moves, depth),
    }
}

/// The move with the highest [`greedy_score`]; the first one wins ties.
pub fn greedy_move(board: &Board, player: Player, legal_moves: &[Move]) -> Option<Move> {
    let mut best: Option<(Move, i32)> = None;

    for &mv in legal_moves {
        let Some(score) = greedy_score(board, mv, player) else {
            continue;
        };
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((mv, score));
        }
    }

    best.map(|(mv, _)| mv).or_else(|| legal_moves.first().copied())
}

/// The move with the best minimax value at `depth` plies.
///
/// The root keeps its alpha bound across children. A child whose value
/// does not beat the current best comes back as an upper bound at most
/// equal to it, so the strict comparison still selects exactly the move
/// an unpruned search would.
pub fn minimax_move(board: &Board, player: Player, legal_moves: &[Move], depth: u32) -> Option<Move> {
    let depth = clamp_depth(depth);
    let mut alpha = i32::MIN;
    let mut best: Option<(Move, i32)> = None;

    for &mv in legal_moves {
        let Some(next) = board.with_move(mv, player) else {
            continue;
        };
        let score = alpha_beta(&next, depth - 1, false, player, alpha, i32::MAX);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((mv, score));
            alpha = alpha.max(score);
        }
    }

    best.map(|(mv, _)| mv).or_else(|| legal_moves.first().copied())
}

/// Fail-soft alpha-beta. Scores are always from `root`'s point of view;
/// `maximizing` says whether `root` is the side to move at this node.
///
/// A side with no legal moves ends the line and the position is
/// evaluated as it stands.
fn alpha_beta(
    board: &Board,
    depth: u32,
    maximizing: bool,
    root: Player,
    mut alpha: i32,
    mut beta: i32,
) -> i32 {
    if depth == 0 {
        return evaluate(board, root);
    }

    let side = if maximizing { root } else { root.opponent() };
    let moves = board.legal_moves(side);
    if moves.is_empty() {
        return evaluate(board, root);
    }

    if maximizing {
        let mut best = i32::MIN;
        for mv in moves {
            let Some(next) = board.with_move(mv, side) else {
                continue;
            };
            let score = alpha_beta(&next, depth - 1, false, root, alpha, beta);
            best = best.max(score);
            alpha = alpha.max(score);
            if beta <= alpha {
                break;
            }
        }
        best
    } else {
        let mut best = i32::MAX;
        for mv in moves {
            let Some(next) = board.with_move(mv, side) else {
                continue;
            };
            let score = alpha_beta(&next, depth - 1, true, root, alpha, beta);
            best = best.min(score);
            beta = beta.min(score);
            if beta <= alpha {
                break;
            }
        }
        best
    }
}
