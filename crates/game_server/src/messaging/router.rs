//! Message routing logic for dispatching client messages.
//!
//! This module handles the parsing of incoming text frames and routes each
//! message to matchmaking or to the session's room.

use crate::connection::{ConnectionManager, SessionHandle, SessionId};
use crate::error::ServerError;
use crate::rooms::{MoveOutcome, MoveRejection, RoomId, RoomState};
use othello_core::{ClientMessage, ServerMessage};
use tracing::{debug, trace, warn};

/// Routes a raw client message.
///
/// Decoding failures are answered with an `error` message and the
/// connection is kept open. The first decoded message from a session that
/// has never been seated places it into matchmaking before it is handled,
/// so a client may open with a `move` instead of a `join`.
///
/// # Arguments
///
/// * `text` - The raw message text from the client (expected to be JSON)
/// * `session_id` - The session the frame arrived on
/// * `connections` - Session registry, also giving access to the matchmaker
///
/// # Returns
///
/// `Ok(())` once the message has been handled, or a `ServerError` if the
/// session is not registered or matchmaking failed internally.
///
/// # Example Message Format
///
/// ```json
/// { "type": "move", "row": 2, "col": 3 }
/// ```
pub async fn route_client_message(
    text: &str,
    session_id: SessionId,
    connections: &ConnectionManager,
) -> Result<(), ServerError> {
    let message = match ClientMessage::parse(text) {
        Ok(message) => message,
        Err(e) => {
            debug!("📭 Undecodable message from {}: {}", session_id, e);
            connections
                .send_to_session(session_id, ServerMessage::error(e.to_string()))
                .await;
            return Ok(());
        }
    };

    trace!("📨 Routing {:?} from session {}", message, session_id);

    match message {
        ClientMessage::Join { name, room_id } => {
            handle_join(session_id, name, room_id.map(RoomId), connections).await
        }
        ClientMessage::Move { row, col } => {
            if connections.is_unmatched(session_id).await {
                debug!("🎯 Session {} sent a move before joining, matchmaking it", session_id);
                handle_join(session_id, None, None, connections).await?;
            }
            handle_move(session_id, row, col, connections).await
        }
    }
}

fn registered(handle: Option<SessionHandle>, session_id: SessionId) -> Result<SessionHandle, ServerError> {
    handle.ok_or_else(|| ServerError::Internal(format!("session {session_id} is not registered")))
}

/// Places a session into a room.
///
/// A session still seated in a waiting or running room is told it is
/// already in a room. A session whose room has finished, or was torn down,
/// gives up that seat first and is queued again. A failed direct join is
/// answered with an `error` and the connection is closed.
pub async fn handle_join(
    session_id: SessionId,
    name: Option<String>,
    room_id: Option<RoomId>,
    connections: &ConnectionManager,
) -> Result<(), ServerError> {
    let handle = registered(connections.handle(session_id).await, session_id)?;

    if let Some((current, room)) = connections.current_room(session_id).await {
        let active = match room {
            Some(room) => room.lock().await.state() != RoomState::Finished,
            None => false,
        };
        if active {
            handle.send(ServerMessage::error("already in a room"));
            return Ok(());
        }
        debug!("🔄 Session {} leaving room {} to play again", session_id, current);
        connections.leave_room(session_id).await;
    }

    if let Some(name) = name {
        connections.set_name(session_id, name).await;
    }

    let matchmaker = connections.matchmaker();
    let assignment = match room_id {
        None => matchmaker.assign(handle.clone()).await?,
        Some(room_id) => match matchmaker.join_room(room_id, handle.clone()).await {
            Ok(assignment) => assignment,
            Err(e) => {
                warn!("🚪 Session {} could not join room {}: {}", session_id, room_id, e);
                handle.send(ServerMessage::error(e.to_string()));
                handle.close(e.to_string());
                return Ok(());
            }
        },
    };

    if !connections.bind_room(session_id, &assignment).await {
        debug!("👻 Session {} vanished while being seated", session_id);
        matchmaker.leave(assignment.room_id, session_id).await;
    }
    Ok(())
}

async fn handle_move(
    session_id: SessionId,
    row: i64,
    col: i64,
    connections: &ConnectionManager,
) -> Result<(), ServerError> {
    let handle = registered(connections.handle(session_id).await, session_id)?;

    let room = connections
        .current_room(session_id)
        .await
        .and_then(|(_, room)| room);

    let Some(room) = room else {
        handle.send(ServerMessage::move_rejected(MoveRejection::GameNotActive.as_str()));
        return Ok(());
    };

    let outcome = room.lock().await.handle_move(&handle, row, col);
    if let MoveOutcome::Accepted { game_over: true, .. } = outcome {
        debug!("🏁 Session {} played the final move", session_id);
    }
    Ok(())
}
