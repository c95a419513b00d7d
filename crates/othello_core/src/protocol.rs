//! Wire protocol definitions for client-server communication.
//!
//! Every frame is a single JSON object carrying a `type` discriminator.
//! Clients send [`ClientMessage`]s; the server answers with
//! [`ServerMessage`]s.
//!
//! A join request:
//! ```json
//! { "type": "join", "name": "alice" }
//! ```
//!
//! A move:
//! ```json
//! { "type": "move", "row": 2, "col": 3 }
//! ```

use crate::error::ProtocolError;
use crate::state::GameState;
use crate::types::Player;
use serde::{Deserialize, Serialize};

/// A message sent from a client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Request a seat. Without `room_id` the server matchmakes.
    Join {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<u64>,
    },

    /// Place a piece. Any JSON number is accepted as a coordinate so
    /// out-of-range values reach the room and are rejected as an invalid
    /// move rather than as a malformed payload.
    Move {
        #[serde(deserialize_with = "coordinate")]
        row: i64,
        #[serde(deserialize_with = "coordinate")]
        col: i64,
    },
}

/// Reads a coordinate from any JSON number. Values that do not fit an
/// `i64` (huge integers, fractions, exponents) become `i64::MAX`, which no
/// board accepts.
fn coordinate<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    Ok(number.as_i64().unwrap_or(i64::MAX))
}

impl ClientMessage {
    /// Decodes one text frame.
    ///
    /// A frame that is not a JSON object with a string `type` is
    /// [`ProtocolError::Malformed`]; a recognisable object with an
    /// unsupported `type` is [`ProtocolError::UnknownType`].
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ProtocolError::Malformed("missing \"type\" field".to_string()))?;

        match kind {
            "join" | "move" => {}
            other => return Err(ProtocolError::UnknownType(other.to_string())),
        }

        serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    pub fn join() -> Self {
        ClientMessage::Join { name: None, room_id: None }
    }

    pub fn play(row: usize, col: usize) -> Self {
        ClientMessage::Move { row: row as i64, col: col as i64 }
    }
}

/// A message sent from the server to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        player_color: Player,
        room_id: u64,
        message: String,
    },
    Waiting {
        message: String,
    },
    GameStart {
        message: String,
        game_state: GameState,
    },
    GameUpdate {
        game_state: GameState,
    },
    MoveResponse {
        success: bool,
        message: String,
    },
    OpponentDisconnected {
        message: String,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn welcome(player: Player, room_id: u64) -> Self {
        ServerMessage::Welcome {
            player_color: player,
            room_id,
            message: format!("welcome, you are {player} in room {room_id}"),
        }
    }

    pub fn waiting() -> Self {
        ServerMessage::Waiting {
            message: "waiting for opponent".to_string(),
        }
    }

    pub fn game_start(game_state: GameState) -> Self {
        ServerMessage::GameStart {
            message: "game started".to_string(),
            game_state,
        }
    }

    pub fn game_update(game_state: GameState) -> Self {
        ServerMessage::GameUpdate { game_state }
    }

    pub fn move_accepted() -> Self {
        ServerMessage::MoveResponse {
            success: true,
            message: "move accepted".to_string(),
        }
    }

    pub fn move_rejected(reason: impl Into<String>) -> Self {
        ServerMessage::MoveResponse {
            success: false,
            message: reason.into(),
        }
    }

    pub fn opponent_disconnected() -> Self {
        ServerMessage::OpponentDisconnected {
            message: "opponent disconnected".to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// The `type` tag this message carries on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Welcome { .. } => "welcome",
            ServerMessage::Waiting { .. } => "waiting",
            ServerMessage::GameStart { .. } => "game_start",
            ServerMessage::GameUpdate { .. } => "game_update",
            ServerMessage::MoveResponse { .. } => "move_response",
            ServerMessage::OpponentDisconnected { .. } => "opponent_disconnected",
            ServerMessage::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn test_parse_join_variants() {
        assert_eq!(ClientMessage::parse(r#"{"type":"join"}"#).unwrap(), ClientMessage::join());
        assert_eq!(
            ClientMessage::parse(r#"{"type":"join","name":"ana","room_id":4}"#).unwrap(),
            ClientMessage::Join { name: Some("ana".into()), room_id: Some(4) }
        );
    }

    #[test]
    fn test_parse_move_keeps_signed_coordinates() {
        assert_eq!(
            ClientMessage::parse(r#"{"type":"move","row":-1,"col":9}"#).unwrap(),
            ClientMessage::Move { row: -1, col: 9 }
        );
    }

    #[test]
    fn test_parse_move_with_unrepresentable_coordinates() {
        for text in [
            r#"{"type":"move","row":18446744073709551616,"col":3}"#,
            r#"{"type":"move","row":9223372036854775808,"col":3}"#,
            r#"{"type":"move","row":1e30,"col":3}"#,
            r#"{"type":"move","row":2.5,"col":3}"#,
        ] {
            assert_eq!(
                ClientMessage::parse(text).unwrap(),
                ClientMessage::Move { row: i64::MAX, col: 3 },
                "{text}"
            );
        }
        assert!(matches!(
            ClientMessage::parse(r#"{"type":"move","row":null,"col":3}"#),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(ClientMessage::parse("not json"), Err(ProtocolError::Malformed(_))));
        assert!(matches!(ClientMessage::parse("[1,2]"), Err(ProtocolError::Malformed(_))));
        assert!(matches!(ClientMessage::parse(r#"{"row":1}"#), Err(ProtocolError::Malformed(_))));
        assert!(matches!(
            ClientMessage::parse(r#"{"type":"move","row":"a","col":1}"#),
            Err(ProtocolError::Malformed(_))
        ));

        let err = ClientMessage::parse(r#"{"type":"chat","text":"hi"}"#).unwrap_err();
        assert_eq!(err.to_string(), "unknown message type: chat");
    }

    #[test]
    fn test_server_message_tags() {
        let start = ServerMessage::game_start(Board::new().snapshot(Player::Black));
        let json = serde_json::to_value(&start).unwrap();
        assert_eq!(json["type"], start.kind());
        assert_eq!(json["game_state"]["current_player"], 1);

        let welcome = serde_json::to_value(ServerMessage::welcome(Player::White, 7)).unwrap();
        assert_eq!(welcome["type"], "welcome");
        assert_eq!(welcome["player_color"], 2);
        assert_eq!(welcome["room_id"], 7);

        let rejected = serde_json::to_value(ServerMessage::move_rejected("not your turn")).unwrap();
        assert_eq!(rejected["type"], "move_response");
        assert_eq!(rejected["success"], false);
        assert_eq!(rejected["message"], "not your turn");
    }
}
