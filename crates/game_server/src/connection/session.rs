//! Per-connection session state.

use super::{Outbox, SessionHandle, SessionId};
use crate::rooms::{Room, RoomHandle, RoomId};
use std::net::SocketAddr;
use std::sync::Weak;
use std::time::SystemTime;
use tokio::sync::Mutex;

/// Represents an individual client session on the server.
///
/// The back-reference to the room is weak: the matchmaker registry owns
/// rooms, and a session must never keep a torn-down room alive.
///
/// # Fields
///
/// * `id` - Identifier assigned on accept
/// * `remote_addr` - The network address of the connected client
/// * `connected_at` - Timestamp when the connection was established
/// * `name` - Display name from the last `join`, if any
/// * `room_id` / `room` - The current seat, once assigned
/// * `matched` - Whether the session has ever been given a seat
/// * `outbox` - Queue drained by the connection's writer task
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub remote_addr: SocketAddr,
    pub connected_at: SystemTime,
    pub name: Option<String>,
    pub room_id: Option<RoomId>,
    pub room: Option<Weak<Mutex<Room>>>,
    pub matched: bool,
    pub outbox: Outbox,
}

impl Session {
    /// Creates an unseated session for a freshly accepted connection.
    pub fn new(id: SessionId, remote_addr: SocketAddr, outbox: Outbox) -> Self {
        Self {
            id,
            remote_addr,
            connected_at: SystemTime::now(),
            name: None,
            room_id: None,
            room: None,
            matched: false,
            outbox,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle::new(self.id, self.outbox.clone())
    }

    /// The room this session is seated in, if it still exists.
    pub fn room(&self) -> Option<RoomHandle> {
        self.room.as_ref().and_then(Weak::upgrade)
    }

    pub fn seat(&mut self, room_id: RoomId, room: &RoomHandle) {
        self.room_id = Some(room_id);
        self.matched = true;
        self.room = Some(std::sync::Arc::downgrade(room));
    }

    /// Clears the seat, returning the room id it referred to.
    ///
    /// `matched` stays set: leaving a room is not a reason to matchmake again.
    pub fn unseat(&mut self) -> Option<RoomId> {
        self.room = None;
        self.room_id.take()
    }

    /// Label used in log lines: the display name when known.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", name, self.id),
            None => self.id.to_string(),
        }
    }
}
