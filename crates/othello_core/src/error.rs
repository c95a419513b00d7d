//! Error types for rules evaluation and protocol decoding.

/// Reasons the engine refuses a board, move or encoded value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// The coordinate lies outside the 8x8 board
    #[error("coordinate ({row}, {col}) is off the board")]
    OutOfBounds { row: i64, col: i64 },

    /// The target square already holds a piece
    #[error("square {0} is already occupied")]
    Occupied(crate::Move),

    /// No direction sandwiches an opposing run
    #[error("move {0} flips no opposing pieces")]
    NoFlips(crate::Move),

    /// A cell value other than 0, 1 or 2
    #[error("invalid cell value: {0}")]
    InvalidCell(u8),

    /// A player id other than 1 or 2
    #[error("invalid player id: {0}")]
    InvalidPlayer(u8),
}

/// Failures decoding an inbound protocol message.
///
/// The display strings are sent back to clients verbatim inside `error`
/// messages, so they stay short and lower-case.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Not JSON, not an object, or fields of the wrong shape
    #[error("malformed message: {0}")]
    Malformed(String),

    /// Well-formed JSON carrying a `type` this server does not understand
    #[error("unknown message type: {0}")]
    UnknownType(String),
}
