//! # Othello Core
//!
//! Rules engine, value types and wire protocol shared by the game server,
//! the search AI and the bot client.
//!
//! ## Modules
//!
//! * [`types`] - players, cells, coordinates and results
//! * [`board`] - the [`Board`] engine: legal moves, flips, termination
//! * [`state`] - immutable [`GameState`] snapshots
//! * [`protocol`] - JSON [`ClientMessage`] and [`ServerMessage`] frames
//! * [`error`] - [`RulesError`] and [`ProtocolError`]

pub mod board;
pub mod error;
pub mod protocol;
pub mod state;
pub mod types;

pub use board::Board;
pub use error::{ProtocolError, RulesError};
pub use protocol::{ClientMessage, ServerMessage};
pub use state::{GameState, Scores};
pub use types::{Cell, Move, Player, Winner, BOARD_SIZE};
