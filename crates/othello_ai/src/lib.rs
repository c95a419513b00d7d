//! # Othello AI
//!
//! Move selection for automated players. The AI depends only on the
//! engine contract in `othello_core`: it reads a [`Board`], asks for legal
//! moves and simulates them on copies. It never talks to the server.
//!
//! Three strategies are available:
//!
//! * [`Strategy::Random`] - a uniformly random legal move
//! * [`Strategy::Greedy`] - best immediate gain plus square weight
//! * [`Strategy::Minimax`] - depth-limited minimax with alpha-beta pruning
//!   over the [`heuristic::evaluate`] function

pub mod heuristic;
pub mod search;
pub mod strategy;

pub use search::{choose_move, greedy_move, minimax_move};
pub use strategy::{clamp_depth, ParseStrategyError, Strategy, DEFAULT_SEARCH_DEPTH, MAX_SEARCH_DEPTH};

use othello_core::{Board, GameState, Move, Player};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// A configured player: strategy, depth and its own random source.
#[derive(Debug, Clone)]
pub struct SearchAi {
    strategy: Strategy,
    depth: u32,
    rng: StdRng,
}

impl SearchAi {
    pub fn new(strategy: Strategy, depth: u32) -> Self {
        Self {
            strategy,
            depth: clamp_depth(depth),
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic variant for tests and reproducible matches.
    pub fn with_seed(strategy: Strategy, depth: u32, seed: u64) -> Self {
        Self {
            strategy,
            depth: clamp_depth(depth),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Chooses a move for `player` on `board`.
    pub fn choose(&mut self, board: &Board, player: Player) -> Option<Move> {
        let legal = board.legal_moves(player);
        let choice = choose_move(board, player, &legal, self.strategy, self.depth, &mut self.rng);
        debug!(
            "🤖 {} ({}) picked {:?} from {} legal moves",
            self.strategy,
            player,
            choice,
            legal.len()
        );
        choice
    }

    /// Chooses a move from a server snapshot, or `None` when it is not
    /// `player`'s turn or the game is over.
    pub fn choose_for_state(&mut self, state: &GameState, player: Player) -> Option<Move> {
        if !state.is_turn_of(player) {
            return None;
        }
        choose_move(
            &state.board,
            player,
            &state.valid_moves,
            self.strategy,
            self.depth,
            &mut self.rng,
        )
    }
}

impl Default for SearchAi {
    fn default() -> Self {
        Self::new(Strategy::default(), DEFAULT_SEARCH_DEPTH)
    }
}
