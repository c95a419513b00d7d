//! Rooms and matchmaking.
//!
//! A [`Room`] runs one two-player match; the [`Matchmaker`] owns the
//! registry of live rooms and places arriving sessions into them.

pub mod matchmaker;
pub mod room;

pub use matchmaker::{Assignment, Matchmaker, MatchmakerStats};
pub use room::{Departure, JoinRejection, MoveOutcome, MoveRejection, Room, RoomState};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Monotonically increasing room identifier. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared handle to a room; its mutex is the room-scoped lock.
pub type RoomHandle = Arc<Mutex<Room>>;
