//! # Game Server - Multi-room Othello over WebSocket
//!
//! Accepts WebSocket connections, pairs sessions into two-player rooms and
//! drives each room's game with the `othello_core` engine.
//!
//! ## Architecture Overview
//!
//! ### Core Components
//!
//! * **Connection Manager** - Session registry, admission limits, disconnects
//! * **Matchmaker** - Room registry; assigns arrivals to rooms or opens new ones
//! * **Room** - One match: seats, turn order, pass rule, termination
//! * **Router** - Decodes frames and dispatches `join` and `move`
//!
//! ### Message Flow
//!
//! 1. Client sends one JSON object per WebSocket text frame
//! 2. The router decodes it and answers malformed input with an `error`
//! 3. `join` goes to the matchmaker, `move` to the session's room
//! 4. The room validates and applies the move under its own lock and
//!    enqueues the resulting state for both players
//! 5. Each connection's writer task sends queued messages in order
//!
//! ## Thread Safety
//!
//! * Each room sits behind its own `tokio::sync::Mutex`
//! * The room registry and the session registry each sit behind an `RwLock`
//! * The room registry lock is never held while a room lock is acquired
//!
//! ## Error Handling
//!
//! The server uses structured error types ([`ServerError`], [`JoinError`]).
//! Only failing to bind the listener stops the server; every per-session
//! problem is reported to that session and the server carries on.

// Re-export core types and functions for easy access
pub use config::ServerConfig;
pub use connection::{ConnectionManager, SessionId};
pub use error::{JoinError, ServerError};
pub use rooms::{Matchmaker, MatchmakerStats, RoomId, RoomState};
pub use server::GameServer;
pub use shutdown::ShutdownState;
pub use utils::{create_server, create_server_with_config};

// Public module declarations
pub mod config;
pub mod connection;
pub mod error;
pub mod rooms;
pub mod server;
pub mod shutdown;
pub mod utils;

// Internal modules (not part of public API)
mod messaging;
mod tests;
