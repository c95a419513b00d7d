//! Error types and handling for the game server.
//!
//! This module defines the error types that can occur during server operations,
//! providing clear categorization of different failure modes.

use crate::rooms::RoomId;

/// Enumeration of possible server errors.
///
/// Categorizes errors into network-related and internal server errors
/// to help with debugging and error handling.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Network-related errors such as binding failures or connection issues
    #[error("Network error: {0}")]
    Network(String),

    /// Internal server errors such as broken room bookkeeping
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Reasons a direct join to a specific room is refused.
///
/// The display strings are what the client receives in its `error` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    /// No room with this id is registered
    #[error("room not found")]
    RoomNotFound(RoomId),

    /// The room already has two players, has started, or is closing
    #[error("room full")]
    RoomFull(RoomId),
}
