//! Connection manager for tracking and managing client sessions.
//!
//! This module provides the session registry: it admits connections up to
//! the configured limit, records which room each session sits in, and
//! detaches sessions from their rooms when they go away.

use super::{Outbound, Outbox, Session, SessionHandle, SessionId};
use crate::rooms::{Assignment, Matchmaker, RoomHandle, RoomId};
use othello_core::ServerMessage;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Central registry of all client sessions.
///
/// # Architecture
///
/// * Uses `RwLock<HashMap>` for the session registry, separate from the
///   matchmaker's room registry and from every room lock
/// * The registry lock is released before any room or matchmaker call
/// * Removing a session's seat binding happens under the registry write
///   lock, so a seat is released exactly once even when a disconnect races
///   with a `join`
#[derive(Debug)]
pub struct ConnectionManager {
    /// Map of session ID to session state
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,

    /// Room registry shared with the server
    matchmaker: Arc<Matchmaker>,

    /// Admission limit
    max_connections: usize,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    ///
    /// # Arguments
    ///
    /// * `matchmaker` - The room registry sessions are placed into
    /// * `max_connections` - Maximum number of concurrent sessions
    pub fn new(matchmaker: Arc<Matchmaker>, max_connections: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            matchmaker,
            max_connections,
        }
    }

    pub fn matchmaker(&self) -> Arc<Matchmaker> {
        self.matchmaker.clone()
    }

    /// Registers a new session.
    ///
    /// # Returns
    ///
    /// The new session's id, or `None` when `max_connections` sessions are
    /// already registered.
    pub async fn add_session(&self, remote_addr: SocketAddr, outbox: Outbox) -> Option<SessionId> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_connections {
            return None;
        }

        let id = SessionId::new();
        sessions.insert(id, Session::new(id, remote_addr, outbox));
        info!("🔗 Session {} from {}", id, remote_addr);
        Some(id)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn handle(&self, id: SessionId) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).map(Session::handle)
    }

    /// Queues a message for one session. Returns false if the session is gone.
    pub async fn send_to_session(&self, id: SessionId, message: ServerMessage) -> bool {
        match self.handle(id).await {
            Some(handle) => handle.send(message),
            None => false,
        }
    }

    pub async fn set_name(&self, id: SessionId, name: String) {
        if let Some(session) = self.sessions.write().await.get_mut(&id) {
            session.name = Some(name);
        }
    }

    /// The room id the session is bound to and, if it is still alive, the room.
    pub async fn current_room(&self, id: SessionId) -> Option<(RoomId, Option<RoomHandle>)> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id)?;
        session.room_id.map(|room_id| (room_id, session.room()))
    }

    /// Whether the session is still registered and has never been seated.
    pub async fn is_unmatched(&self, id: SessionId) -> bool {
        self.sessions
            .read()
            .await
            .get(&id)
            .is_some_and(|session| !session.matched)
    }

    /// Records a seat assignment on the session.
    ///
    /// # Returns
    ///
    /// False when the session disconnected while it was being seated; the
    /// caller then owns releasing the seat.
    pub async fn bind_room(&self, id: SessionId, assignment: &Assignment) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) => {
                session.seat(assignment.room_id, &assignment.room);
                debug!(
                    "📌 Session {} bound to room {} as {}",
                    session.label(),
                    assignment.room_id,
                    assignment.player
                );
                true
            }
            None => false,
        }
    }

    /// Releases the session's seat, if it has one.
    pub async fn leave_room(&self, id: SessionId) {
        let room_id = self
            .sessions
            .write()
            .await
            .get_mut(&id)
            .and_then(Session::unseat);

        if let Some(room_id) = room_id {
            self.matchmaker.leave(room_id, id).await;
        }
    }

    /// Removes a session and releases its seat. Safe to call repeatedly.
    ///
    /// # Returns
    ///
    /// True if this call removed the session.
    pub async fn disconnect(&self, id: SessionId) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        let Some(mut session) = removed else {
            return false;
        };

        if let Some(room_id) = session.unseat() {
            self.matchmaker.leave(room_id, id).await;
        }
        let connected_for = session.connected_at.elapsed().unwrap_or_default();
        info!(
            "❌ Session {} from {} disconnected after {:.1?}",
            session.label(),
            session.remote_addr,
            connected_for
        );
        true
    }

    /// Asks every open session to close.
    ///
    /// # Returns
    ///
    /// The number of sessions the close request was queued for.
    pub async fn close_all(&self, reason: &str) -> usize {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .filter(|session| session.outbox.send(Outbound::Close(reason.to_string())).is_ok())
            .count()
    }
}
