//! Connection management for client sessions.
//!
//! This module handles the lifecycle of client sessions: identity, the
//! outbound queue each session's writer task drains, and the registry that
//! ties sessions to their rooms.

pub mod manager;
pub mod session;

pub use manager::ConnectionManager;
pub use session::Session;

use othello_core::ServerMessage;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

/// Opaque identifier assigned to every accepted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One item on a session's outbound queue.
///
/// A single writer task per connection drains the queue, so frames for one
/// connection are written in enqueue order and never interleave.
#[derive(Debug)]
pub enum Outbound {
    /// A protocol message, serialized to a text frame by the writer
    Message(ServerMessage),
    /// A raw control frame such as a pong
    Frame(Message),
    /// Send a close frame with this reason and stop writing
    Close(String),
}

/// Sender half of a session's outbound queue.
pub type Outbox = mpsc::UnboundedSender<Outbound>;

/// What a room needs to seat a session: its id and its outbound queue.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: SessionId,
    pub outbox: Outbox,
}

impl SessionHandle {
    pub fn new(id: SessionId, outbox: Outbox) -> Self {
        Self { id, outbox }
    }

    /// Enqueues a message without blocking. Returns false once the
    /// session's writer has gone away.
    pub fn send(&self, message: ServerMessage) -> bool {
        self.outbox.send(Outbound::Message(message)).is_ok()
    }

    /// Asks the writer to close the connection after flushing earlier frames.
    pub fn close(&self, reason: impl Into<String>) -> bool {
        self.outbox.send(Outbound::Close(reason.into())).is_ok()
    }
}
