//! A single match between two sessions.
//!
//! A [`Room`] owns the engine board, the seat assignments and the turn
//! state machine. It is always used behind a room-scoped
//! `tokio::sync::Mutex`, and it enqueues every outbound message while that
//! lock is held. Enqueueing is a non-blocking channel send, so the order in
//! which peers observe room events is exactly the order in which the room
//! produced them.

use super::RoomId;
use crate::connection::{SessionHandle, SessionId};
use othello_core::{Board, GameState, Move, Player, ServerMessage};
use std::time::SystemTime;
use tracing::{debug, info};

/// Lifecycle of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomState {
    /// Fewer than two players seated
    Waiting,
    /// Both seats taken, moves are being played
    InProgress,
    /// Game over, a participant left mid-game, or the room was closed
    Finished,
}

/// Why [`Room::add_session`] refused a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRejection {
    /// Both seats are taken
    RoomFull,
    /// The room is no longer accepting players
    Closed,
}

/// Why a move was refused, in the order the checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    GameNotActive,
    NotYourTurn,
    InvalidMove,
}

impl MoveRejection {
    pub fn as_str(self) -> &'static str {
        match self {
            MoveRejection::GameNotActive => "game not active",
            MoveRejection::NotYourTurn => "not your turn",
            MoveRejection::InvalidMove => "invalid move",
        }
    }
}

/// Result of [`Room::handle_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Rejected(MoveRejection),
    Accepted {
        flipped: usize,
        /// The side to move next; equals the mover after a pass
        next: Player,
        game_over: bool,
    },
}

/// Result of [`Room::remove_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    /// The session held no seat here
    NotSeated,
    /// Another session is still seated
    Remaining,
    /// No seats remain; the room can be dropped from the registry
    Empty,
}

#[derive(Debug)]
struct Seat {
    handle: SessionHandle,
    player: Player,
}

/// Server object owning one match and its seated sessions.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    seats: [Option<Seat>; 2],
    board: Board,
    current: Player,
    state: RoomState,
    created_at: SystemTime,
    moves_played: u32,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            seats: [None, None],
            board: Board::new(),
            current: Player::Black,
            state: RoomState::Waiting,
            created_at: SystemTime::now(),
            moves_played: 0,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    /// Number of seated sessions.
    pub fn occupancy(&self) -> usize {
        self.seats.iter().flatten().count()
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn moves_played(&self) -> u32 {
        self.moves_played
    }

    /// The current game state with the side to move.
    pub fn snapshot(&self) -> GameState {
        self.board.snapshot(self.current)
    }

    /// The player seated for `session`, if any.
    pub fn player_of(&self, session: SessionId) -> Option<Player> {
        self.seat(session).map(|seat| seat.player)
    }

    fn seat(&self, session: SessionId) -> Option<&Seat> {
        self.seats.iter().flatten().find(|seat| seat.handle.id == session)
    }

    fn seat_index(&self, session: SessionId) -> Option<usize> {
        self.seats
            .iter()
            .position(|seat| seat.as_ref().is_some_and(|seat| seat.handle.id == session))
    }

    fn broadcast(&self, message: &ServerMessage) {
        for seat in self.seats.iter().flatten() {
            if !seat.handle.send(message.clone()) {
                debug!("📪 Room {} could not reach session {}", self.id, seat.handle.id);
            }
        }
    }

    /// Seats a session.
    ///
    /// The newcomer gets the first free player, black before white, and is
    /// sent `welcome`. A lone player is then sent `waiting`; when the second
    /// seat fills the room starts and both players receive `game_start`
    /// carrying the same initial state.
    ///
    /// # Returns
    ///
    /// The assigned player, or why the session cannot be seated.
    pub fn add_session(&mut self, handle: SessionHandle) -> Result<Player, JoinRejection> {
        if self.state != RoomState::Waiting {
            return Err(JoinRejection::Closed);
        }

        let taken: Vec<Player> = self.seats.iter().flatten().map(|seat| seat.player).collect();
        let Some(player) = Player::ALL.into_iter().find(|player| !taken.contains(player)) else {
            return Err(JoinRejection::RoomFull);
        };
        let Some(slot) = self.seats.iter_mut().find(|slot| slot.is_none()) else {
            return Err(JoinRejection::RoomFull);
        };

        let alone = taken.is_empty();
        handle.send(ServerMessage::welcome(player, self.id.0));
        if alone {
            handle.send(ServerMessage::waiting());
        }
        info!("🪑 Session {} seated as {} in room {}", handle.id, player, self.id);
        *slot = Some(Seat { handle, player });

        if !alone {
            self.start();
        }

        Ok(player)
    }

    fn start(&mut self) {
        self.board = Board::new();
        self.current = Player::Black;
        self.moves_played = 0;
        self.state = RoomState::InProgress;

        info!("🎮 Room {} started", self.id);
        self.broadcast(&ServerMessage::game_start(self.snapshot()));
    }

    /// Processes a move request from `mover`.
    ///
    /// Rejections are answered to the mover only. An accepted move is
    /// followed by a `game_update` to both seats and then a positive
    /// `move_response` to the mover. If the opponent has no legal reply the
    /// mover keeps the turn; if neither side can move the game is finished.
    pub fn handle_move(&mut self, mover: &SessionHandle, row: i64, col: i64) -> MoveOutcome {
        match self.try_move(mover.id, row, col) {
            Err(rejection) => {
                debug!(
                    "🚫 Room {} rejected ({}, {}) from {}: {}",
                    self.id,
                    row,
                    col,
                    mover.id,
                    rejection.as_str()
                );
                mover.send(ServerMessage::move_rejected(rejection.as_str()));
                MoveOutcome::Rejected(rejection)
            }
            Ok((flipped, player)) => {
                let game_over = self.advance_turn(player);
                self.broadcast(&ServerMessage::game_update(self.snapshot()));
                mover.send(ServerMessage::move_accepted());
                MoveOutcome::Accepted {
                    flipped,
                    next: self.current,
                    game_over,
                }
            }
        }
    }

    fn try_move(&mut self, session: SessionId, row: i64, col: i64) -> Result<(usize, Player), MoveRejection> {
        if self.state != RoomState::InProgress {
            return Err(MoveRejection::GameNotActive);
        }
        let player = self.player_of(session).ok_or(MoveRejection::GameNotActive)?;
        if player != self.current {
            return Err(MoveRejection::NotYourTurn);
        }
        let mv = Move::from_signed(row, col).ok_or(MoveRejection::InvalidMove)?;
        let flipped = self
            .board
            .apply_move(mv, player)
            .map_err(|_| MoveRejection::InvalidMove)?;

        self.moves_played += 1;
        debug!("♟️ Room {}: {} played {} flipping {}", self.id, player, mv, flipped);
        Ok((flipped, player))
    }

    /// Hands the turn on after `mover` played. Returns true when the game
    /// has ended.
    fn advance_turn(&mut self, mover: Player) -> bool {
        let opponent = mover.opponent();
        if self.board.has_legal_move(opponent) {
            self.current = opponent;
            return false;
        }
        if self.board.has_legal_move(mover) {
            debug!("⏭️ Room {}: {} has no legal move and passes", self.id, opponent);
            self.current = mover;
            return false;
        }

        self.current = opponent;
        self.state = RoomState::Finished;
        let scores = self.board.scores();
        info!(
            "🏁 Room {} finished after {} moves: black {} - white {}",
            self.id, self.moves_played, scores.black, scores.white
        );
        true
    }

    /// Detaches a session. Calling it again for the same session is a no-op
    /// reporting [`Departure::NotSeated`].
    ///
    /// Leaving a game in progress finishes it: the other player is sent a
    /// single `opponent_disconnected` and detached as well, so the room is
    /// reported empty. A waiting room whose only player leaves is closed so
    /// no late arrival can still be seated in it.
    pub fn remove_session(&mut self, session: SessionId) -> Departure {
        let Some(index) = self.seat_index(session) else {
            return Departure::NotSeated;
        };
        self.seats[index] = None;
        info!("🚪 Session {} left room {}", session, self.id);

        match self.state {
            RoomState::InProgress => {
                self.state = RoomState::Finished;
                if let Some(remaining) = self.seats[1 - index].take() {
                    remaining.handle.send(ServerMessage::opponent_disconnected());
                    info!(
                        "💔 Room {} abandoned, session {} notified",
                        self.id, remaining.handle.id
                    );
                }
                Departure::Empty
            }
            RoomState::Waiting if self.occupancy() == 0 => {
                self.state = RoomState::Finished;
                Departure::Empty
            }
            _ if self.occupancy() == 0 => Departure::Empty,
            _ => Departure::Remaining,
        }
    }
}
