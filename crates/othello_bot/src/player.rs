//! Decision state of one automated player, independent of the socket.

use othello_ai::SearchAi;
use othello_core::{ClientMessage, GameState, Move, Player, ServerMessage, Winner};
use tracing::{debug, info, warn};

/// What the connection loop should do after a server message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// Nothing to send
    Wait,
    /// Send this move after the think delay
    Play(Move),
    /// Queue for another game
    Rejoin,
    /// All requested games are played
    Done,
}

/// Results across the games a bot has finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub abandoned: u32,
}

impl Record {
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.draws + self.abandoned
    }
}

pub struct BotPlayer {
    name: String,
    ai: SearchAi,
    color: Option<Player>,
    room_id: Option<u64>,
    games_wanted: u32,
    record: Record,
}

impl BotPlayer {
    pub fn new(name: impl Into<String>, ai: SearchAi, games_wanted: u32) -> Self {
        Self {
            name: name.into(),
            ai,
            color: None,
            room_id: None,
            games_wanted: games_wanted.max(1),
            record: Record::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Option<Player> {
        self.color
    }

    pub fn record(&self) -> Record {
        self.record
    }

    /// The `join` request, optionally targeting a specific room.
    pub fn join_request(&self, room_id: Option<u64>) -> ClientMessage {
        ClientMessage::Join {
            name: Some(self.name.clone()),
            room_id,
        }
    }

    pub fn on_message(&mut self, message: ServerMessage) -> Reaction {
        match message {
            ServerMessage::Welcome { player_color, room_id, .. } => {
                info!("👋 {} seated as {} in room {}", self.name, player_color, room_id);
                self.color = Some(player_color);
                self.room_id = Some(room_id);
                Reaction::Wait
            }
            ServerMessage::Waiting { .. } => {
                debug!("⏳ {} waiting for an opponent", self.name);
                Reaction::Wait
            }
            ServerMessage::GameStart { game_state, .. } => {
                info!("🎮 {} game started in room {:?}", self.name, self.room_id);
                self.on_state(&game_state)
            }
            ServerMessage::GameUpdate { game_state } => self.on_state(&game_state),
            ServerMessage::MoveResponse { success, message } => {
                if !success {
                    warn!("❌ {} move rejected: {}", self.name, message);
                }
                Reaction::Wait
            }
            ServerMessage::OpponentDisconnected { .. } => {
                info!("🔌 {} lost its opponent", self.name);
                self.record.abandoned += 1;
                self.next_game()
            }
            ServerMessage::Error { message } => {
                warn!("⚠️ {} received error: {}", self.name, message);
                Reaction::Wait
            }
        }
    }

    fn on_state(&mut self, state: &GameState) -> Reaction {
        let Some(color) = self.color else {
            return Reaction::Wait;
        };

        if state.game_over {
            match state.winner {
                Some(Winner::Player(winner)) if winner == color => self.record.wins += 1,
                Some(Winner::Player(_)) => self.record.losses += 1,
                Some(Winner::Draw) | None => self.record.draws += 1,
            }
            info!(
                "🏁 {} finished a game as {}: {} to {}",
                self.name,
                color,
                state.scores.get(color),
                state.scores.get(color.opponent())
            );
            return self.next_game();
        }

        match self.ai.choose_for_state(state, color) {
            Some(mv) => Reaction::Play(mv),
            None => Reaction::Wait,
        }
    }

    fn next_game(&mut self) -> Reaction {
        self.color = None;
        self.room_id = None;
        if self.record.games() >= self.games_wanted {
            Reaction::Done
        } else {
            Reaction::Rejoin
        }
    }
}
