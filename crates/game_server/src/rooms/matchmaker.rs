//! Room registry and seat assignment.
//!
//! Lock ordering: the registry lock is never held while a room lock is
//! acquired. Seats are *reserved* under the registry lock and only then
//! claimed under the room lock, which keeps concurrent arrivals from
//! over-subscribing a room or opening two rooms where one would do.

use super::{Departure, JoinRejection, Room, RoomHandle, RoomId, RoomState};
use crate::connection::{SessionHandle, SessionId};
use crate::error::{JoinError, ServerError};
use othello_core::Player;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Registry entry: the room plus the number of seats promised to sessions.
#[derive(Debug)]
struct RoomEntry {
    room: RoomHandle,
    reserved: usize,
}

/// Where a session ended up.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub room_id: RoomId,
    pub player: Player,
    pub room: RoomHandle,
}

/// Room counts by lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchmakerStats {
    pub rooms: usize,
    pub waiting: usize,
    pub in_progress: usize,
    pub finished: usize,
}

/// Owns every live room and assigns arriving sessions to them.
#[derive(Debug)]
pub struct Matchmaker {
    rooms: RwLock<BTreeMap<RoomId, RoomEntry>>,
    next_room_id: AtomicU64,
}

impl Default for Matchmaker {
    fn default() -> Self {
        Self::new()
    }
}

impl Matchmaker {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(BTreeMap::new()),
            next_room_id: AtomicU64::new(1),
        }
    }

    /// Reserves a seat in the lowest-numbered room that still has one,
    /// creating and registering a new room when none does.
    async fn reserve(&self) -> (RoomId, RoomHandle) {
        let mut rooms = self.rooms.write().await;

        if let Some((id, entry)) = rooms.iter_mut().find(|(_, entry)| entry.reserved < 2) {
            entry.reserved += 1;
            return (*id, entry.room.clone());
        }

        let id = RoomId(self.next_room_id.fetch_add(1, Ordering::Relaxed));
        let room = Arc::new(Mutex::new(Room::new(id)));
        rooms.insert(id, RoomEntry { room: room.clone(), reserved: 1 });
        info!("🏠 Created room {}", id);
        (id, room)
    }

    /// Places a session into matchmaking.
    ///
    /// # Arguments
    ///
    /// * `handle` - The arriving session's id and outbound queue
    ///
    /// # Returns
    ///
    /// The room and player the session was seated as. A reserved room can
    /// close before the seat is claimed when its waiting player leaves; the
    /// assignment is then retried in another room.
    pub async fn assign(&self, handle: SessionHandle) -> Result<Assignment, ServerError> {
        loop {
            let (room_id, room) = self.reserve().await;
            let joined = room.lock().await.add_session(handle.clone());

            match joined {
                Ok(player) => {
                    return Ok(Assignment { room_id, player, room });
                }
                Err(JoinRejection::Closed) => {
                    debug!("🔁 Room {} closed before session {} was seated, retrying", room_id, handle.id);
                }
                Err(JoinRejection::RoomFull) => {
                    warn!("⚠️ Room {} over-subscribed, reservation count out of step", room_id);
                    return Err(ServerError::Internal(format!("room {room_id} over-subscribed")));
                }
            }
        }
    }

    /// Seats a session in a specific room.
    ///
    /// # Returns
    ///
    /// [`JoinError::RoomNotFound`] for an unknown id, [`JoinError::RoomFull`]
    /// when both seats are taken or the room is no longer waiting.
    pub async fn join_room(&self, room_id: RoomId, handle: SessionHandle) -> Result<Assignment, JoinError> {
        let room = {
            let mut rooms = self.rooms.write().await;
            let entry = rooms.get_mut(&room_id).ok_or(JoinError::RoomNotFound(room_id))?;
            if entry.reserved >= 2 {
                return Err(JoinError::RoomFull(room_id));
            }
            entry.reserved += 1;
            entry.room.clone()
        };

        let player = room
            .lock()
            .await
            .add_session(handle)
            .map_err(|_| JoinError::RoomFull(room_id))?;
        Ok(Assignment { room_id, player, room })
    }

    /// Detaches a session from a room, deleting the room once it is empty.
    pub async fn leave(&self, room_id: RoomId, session: SessionId) -> Departure {
        let Some(room) = self.room(room_id).await else {
            return Departure::NotSeated;
        };

        let (departure, age, moves) = {
            let mut room = room.lock().await;
            let departure = room.remove_session(session);
            let age = room.created_at().elapsed().unwrap_or_default();
            (departure, age, room.moves_played())
        };

        if departure == Departure::Empty && self.rooms.write().await.remove(&room_id).is_some() {
            info!("🗑️ Removed room {} after {:.1?} and {} moves", room_id, age, moves);
        }
        departure
    }

    pub async fn room(&self, room_id: RoomId) -> Option<RoomHandle> {
        self.rooms.read().await.get(&room_id).map(|entry| entry.room.clone())
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Counts rooms by state. Handles are collected under the registry
    /// lock and each room is inspected after it has been released.
    pub async fn stats(&self) -> MatchmakerStats {
        let handles: Vec<RoomHandle> = self
            .rooms
            .read()
            .await
            .values()
            .map(|entry| entry.room.clone())
            .collect();

        let mut stats = MatchmakerStats {
            rooms: handles.len(),
            ..Default::default()
        };
        for room in handles {
            match room.lock().await.state() {
                RoomState::Waiting => stats.waiting += 1,
                RoomState::InProgress => stats.in_progress += 1,
                RoomState::Finished => stats.finished += 1,
            }
        }
        stats
    }
}
