//! Connection handling logic for WebSocket clients.
//!
//! This module contains the core connection handling logic that manages
//! the lifecycle of individual client connections, including WebSocket
//! handshaking, message processing, and cleanup.

use crate::{
    config::ServerConfig,
    connection::{ConnectionManager, Outbound},
    error::ServerError,
    messaging::{handle_join, route_client_message},
};
use futures::{SinkExt, StreamExt};
use othello_core::{ProtocolError, ServerMessage};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, trace, warn};

/// Serializes a protocol message into a text frame.
fn encode(message: &ServerMessage) -> Result<Message, ServerError> {
    serde_json::to_string(message)
        .map(|text| Message::Text(text.into()))
        .map_err(|e| ServerError::Internal(format!("Failed to encode {}: {e}", message.kind())))
}

fn close_frame(reason: &str) -> Message {
    Message::Close(Some(CloseFrame {
        code: CloseCode::Normal,
        reason: reason.to_string().into(),
    }))
}

/// Handles a single client connection from establishment to cleanup.
///
/// # Connection Flow
///
/// 1. Perform WebSocket handshake
/// 2. Register the session, or answer `server full` and close
/// 3. Optionally place the session into matchmaking straight away
/// 4. Start message handling tasks (incoming and outgoing)
/// 5. Disconnect the session, releasing its seat, when either task ends
///
/// # Arguments
///
/// * `stream` - The TCP stream for the client connection
/// * `addr` - The remote address of the client
/// * `connections` - Session registry
/// * `config` - Limits and behaviour flags
///
/// # Returns
///
/// `Ok(())` if the connection was handled successfully, or a `ServerError`
/// if the handshake failed.
///
/// # Message Handling
///
/// * **Incoming Task**: Receives frames from the client and routes them
/// * **Outgoing Task**: The only writer for this connection; drains the
///   session's outbound queue in order
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    connections: Arc<ConnectionManager>,
    config: Arc<ServerConfig>,
) -> Result<(), ServerError> {
    // Perform WebSocket handshake
    let ws_stream = accept_async(stream)
        .await
        .map_err(|e| ServerError::Network(format!("WebSocket handshake failed: {e}")))?;

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (outbox, mut inbox) = mpsc::unbounded_channel::<Outbound>();

    let Some(session_id) = connections.add_session(addr, outbox.clone()).await else {
        warn!("🚫 Rejecting {}: server full", addr);
        let _ = ws_sender.send(encode(&ServerMessage::error("server full"))?).await;
        let _ = ws_sender.send(close_frame("server full")).await;
        let _ = ws_sender.close().await;
        return Ok(());
    };

    if config.assign_on_connect {
        if let Err(e) = handle_join(session_id, None, None, &connections).await {
            error!("Failed to assign session {} on connect: {}", session_id, e);
        }
    }

    // Incoming message task - decodes frames and routes them
    let incoming_task = {
        let connections = connections.clone();
        let outbox = outbox.clone();
        let max_message_size = config.max_message_size;

        async move {
            while let Some(msg) = ws_receiver.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if text.len() > max_message_size {
                            debug!("📏 Session {} sent {} bytes, over the limit", session_id, text.len());
                            let _ = outbox.send(Outbound::Message(ServerMessage::error("message too large")));
                            continue;
                        }

                        // Routed on its own task so a dropped connection cannot
                        // cancel a join between seating and binding.
                        let text = text.as_str().to_owned();
                        let connections = connections.clone();
                        let routed = tokio::spawn(async move {
                            route_client_message(&text, session_id, &connections).await
                        })
                        .await;

                        match routed {
                            Ok(Err(e)) => trace!("❌ Message routing error: {}", e),
                            Err(e) => error!("Routing task for session {} failed: {}", session_id, e),
                            Ok(Ok(())) => {}
                        }
                    }
                    Ok(Message::Binary(_)) => {
                        let reason = ProtocolError::Malformed("binary frames are not supported".to_string());
                        let _ = outbox.send(Outbound::Message(ServerMessage::error(reason.to_string())));
                    }
                    Ok(Message::Close(_)) => {
                        debug!("🔌 Session {} requested close", session_id);
                        break;
                    }
                    Ok(Message::Ping(data)) => {
                        let _ = outbox.send(Outbound::Frame(Message::Pong(data)));
                    }
                    Err(e) => {
                        error!("WebSocket error for session {}: {}", session_id, e);
                        break;
                    }
                    _ => {}
                }
            }
        }
    };

    // Outgoing message task - the single writer for this connection
    let outgoing_task = async move {
        while let Some(item) = inbox.recv().await {
            let frame = match item {
                Outbound::Message(message) => match encode(&message) {
                    Ok(frame) => frame,
                    Err(e) => {
                        error!("{}", e);
                        continue;
                    }
                },
                Outbound::Frame(frame) => frame,
                Outbound::Close(reason) => {
                    debug!("👋 Closing session {}: {}", session_id, reason);
                    let _ = ws_sender.send(close_frame(&reason)).await;
                    let _ = ws_sender.close().await;
                    break;
                }
            };

            if let Err(e) = ws_sender.send(frame).await {
                error!("Failed to send message to session {}: {}", session_id, e);
                break;
            }
        }
    };

    // Run both tasks concurrently until one completes
    tokio::select! {
        _ = incoming_task => {},
        _ = outgoing_task => {},
    }

    connections.disconnect(session_id).await;
    Ok(())
}
