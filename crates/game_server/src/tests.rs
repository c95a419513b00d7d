// Include tests
#[cfg(test)]
mod tests {
    use crate::*;
    use futures::{SinkExt, StreamExt};
    use othello_core::{Player, ServerMessage};
    use serde_json::json;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpStream;
    use tokio::time::{sleep, timeout};
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
    use tracing::debug;

    const WAIT: Duration = Duration::from_secs(5);

    async fn start_server(config: ServerConfig) -> (Arc<GameServer>, SocketAddr) {
        let server = Arc::new(create_server_with_config(ServerConfig {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            ..config
        }));
        let listener = server.bind().await.expect("Failed to bind test listener");
        let addr = listener.local_addr().unwrap();

        let running = server.clone();
        tokio::spawn(async move {
            if let Err(e) = running.serve(listener, None).await {
                debug!("Test server stopped with error: {}", e);
            }
        });
        (server, addr)
    }

    struct TestClient {
        ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    }

    impl TestClient {
        async fn connect(addr: SocketAddr) -> Self {
            let (ws, _) = connect_async(format!("ws://{addr}"))
                .await
                .expect("Failed to connect to test server");
            Self { ws }
        }

        async fn send_text(&mut self, text: &str) {
            self.ws
                .send(Message::Text(text.to_string().into()))
                .await
                .expect("Failed to send frame");
        }

        async fn send(&mut self, value: serde_json::Value) {
            self.send_text(&value.to_string()).await;
        }

        async fn join(&mut self) {
            self.send(json!({ "type": "join" })).await;
        }

        async fn play(&mut self, row: i64, col: i64) {
            self.send(json!({ "type": "move", "row": row, "col": col })).await;
        }

        /// Next protocol message, skipping control frames.
        async fn recv(&mut self) -> ServerMessage {
            loop {
                let frame = timeout(WAIT, self.ws.next())
                    .await
                    .expect("Timed out waiting for a server message")
                    .expect("Connection ended while waiting for a message")
                    .expect("WebSocket error while waiting for a message");
                match frame {
                    Message::Text(text) => {
                        return serde_json::from_str(text.as_str()).expect("Server sent an undecodable message")
                    }
                    Message::Close(frame) => panic!("Connection closed unexpectedly: {frame:?}"),
                    _ => continue,
                }
            }
        }

        async fn recv_kind(&mut self, kind: &str) -> ServerMessage {
            let message = self.recv().await;
            assert_eq!(message.kind(), kind, "unexpected message {message:?}");
            message
        }

        async fn expect_error(&mut self, expected: &str) {
            match self.recv().await {
                ServerMessage::Error { message } => assert_eq!(message, expected),
                other => panic!("expected error '{expected}', got {other:?}"),
            }
        }

        async fn expect_move_response(&mut self, success: bool, expected: &str) {
            match self.recv().await {
                ServerMessage::MoveResponse { success: got, message } => {
                    assert_eq!(got, success);
                    assert_eq!(message, expected);
                }
                other => panic!("expected move_response, got {other:?}"),
            }
        }

        /// Waits for the server to close the connection.
        async fn expect_closed(&mut self) {
            loop {
                match timeout(WAIT, self.ws.next()).await.expect("Timed out waiting for close") {
                    None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return,
                    Some(Ok(Message::Text(text))) => panic!("expected close, got {text}"),
                    Some(Ok(_)) => continue,
                }
            }
        }

        async fn welcome(&mut self) -> (Player, u64) {
            match self.recv().await {
                ServerMessage::Welcome { player_color, room_id, .. } => (player_color, room_id),
                other => panic!("expected welcome, got {other:?}"),
            }
        }
    }

    /// Connects two clients and plays them into a started game.
    async fn started_pair(addr: SocketAddr) -> (TestClient, TestClient, u64) {
        let mut black = TestClient::connect(addr).await;
        black.join().await;
        let (player, room_id) = black.welcome().await;
        assert_eq!(player, Player::Black);
        black.recv_kind("waiting").await;

        let mut white = TestClient::connect(addr).await;
        white.join().await;
        assert_eq!(white.welcome().await, (Player::White, room_id));

        black.recv_kind("game_start").await;
        white.recv_kind("game_start").await;
        (black, white, room_id)
    }

    async fn eventually<F, Fut>(mut check: F)
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        for _ in 0..100 {
            if check().await {
                return;
            }
            sleep(Duration::from_millis(50)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_two_players_start_and_play() {
        let (server, addr) = start_server(ServerConfig::default()).await;
        let (mut black, mut white, _) = started_pair(addr).await;

        black.play(2, 3).await;
        for client in [&mut black, &mut white] {
            match client.recv().await {
                ServerMessage::GameUpdate { game_state } => {
                    assert_eq!(game_state.current_player, Player::White);
                    assert_eq!(game_state.scores.black, 4);
                    assert_eq!(game_state.scores.white, 1);
                    assert!(!game_state.game_over);
                }
                other => panic!("expected game_update, got {other:?}"),
            }
        }
        black.expect_move_response(true, "move accepted").await;

        white.play(0, 0).await;
        white.expect_move_response(false, "invalid move").await;

        black.play(2, 2).await;
        black.expect_move_response(false, "not your turn").await;

        let stats = server.get_matchmaker().stats().await;
        assert_eq!(stats.in_progress, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_game_start_state_is_identical_for_both() {
        let (_server, addr) = start_server(ServerConfig::default()).await;
        let mut black = TestClient::connect(addr).await;
        let mut white = TestClient::connect(addr).await;

        black.join().await;
        black.welcome().await;
        black.recv_kind("waiting").await;
        white.join().await;
        white.welcome().await;

        let ServerMessage::GameStart { game_state: seen_by_black, .. } = black.recv_kind("game_start").await else {
            unreachable!()
        };
        let ServerMessage::GameStart { game_state: seen_by_white, .. } = white.recv_kind("game_start").await else {
            unreachable!()
        };
        assert_eq!(seen_by_black, seen_by_white);
        assert_eq!(seen_by_black.current_player, Player::Black);
        assert_eq!(seen_by_black.valid_moves.len(), 4);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_disconnect_mid_game_notifies_and_removes_room() {
        let (server, addr) = start_server(ServerConfig::default()).await;
        let (mut black, mut white, _) = started_pair(addr).await;

        black.ws.close(None).await.expect("Failed to close");
        white.recv_kind("opponent_disconnected").await;

        let matchmaker = server.get_matchmaker();
        eventually(|| {
            let matchmaker = matchmaker.clone();
            async move { matchmaker.room_count().await == 0 }
        })
        .await;

        // the remaining player can still talk to the server
        white.play(2, 4).await;
        white.expect_move_response(false, "game not active").await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_requeue_after_opponent_left() {
        let (_server, addr) = start_server(ServerConfig::default()).await;
        let (mut black, mut white, first_room) = started_pair(addr).await;

        drop(black.ws.close(None).await);
        white.recv_kind("opponent_disconnected").await;

        white.join().await;
        let (player, room_id) = white.welcome().await;
        assert_eq!(player, Player::Black);
        assert!(room_id > first_room);
        white.recv_kind("waiting").await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_sequential_joins_fill_rooms_in_pairs() {
        let (server, addr) = start_server(ServerConfig::default()).await;
        let mut clients = Vec::new();

        for n in 1..=5usize {
            let mut client = TestClient::connect(addr).await;
            client.join().await;
            let (_, room_id) = client.welcome().await;
            assert_eq!(room_id, ((n + 1) / 2) as u64);
            clients.push(client);
        }

        let matchmaker = server.get_matchmaker();
        assert_eq!(matchmaker.room_count().await, 3);
        let stats = matchmaker.stats().await;
        assert_eq!(stats.in_progress, 2);
        assert_eq!(stats.waiting, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_malformed_and_unknown_messages_keep_connection() {
        let (_server, addr) = start_server(ServerConfig::default()).await;
        let mut client = TestClient::connect(addr).await;

        client.send_text("this is not json").await;
        match client.recv().await {
            ServerMessage::Error { message } => assert!(message.starts_with("malformed message")),
            other => panic!("expected error, got {other:?}"),
        }

        client.send(json!({ "type": "chat", "text": "hello" })).await;
        client.expect_error("unknown message type: chat").await;

        client.send(json!({ "type": "move", "row": "two", "col": 3 })).await;
        match client.recv().await {
            ServerMessage::Error { message } => assert!(message.starts_with("malformed message")),
            other => panic!("expected error, got {other:?}"),
        }

        // Undecodable frames never matchmake; the first decoded move does.
        client.play(2, 3).await;
        assert_eq!(client.welcome().await.0, Player::Black);
        client.recv_kind("waiting").await;
        client.expect_move_response(false, "game not active").await;

        client.join().await;
        client.expect_error("already in a room").await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_first_move_places_session_in_room() {
        let (server, addr) = start_server(ServerConfig::default()).await;

        let mut first = TestClient::connect(addr).await;
        first.play(2, 3).await;
        let (player, room_id) = first.welcome().await;
        assert_eq!(player, Player::Black);
        first.recv_kind("waiting").await;
        first.expect_move_response(false, "game not active").await;

        let mut second = TestClient::connect(addr).await;
        second.play(2, 3).await;
        assert_eq!(second.welcome().await, (Player::White, room_id));
        second.recv_kind("game_start").await;
        second.expect_move_response(false, "not your turn").await;
        first.recv_kind("game_start").await;

        first.play(2, 3).await;
        first.recv_kind("game_update").await;
        second.recv_kind("game_update").await;
        first.expect_move_response(true, "move accepted").await;

        assert_eq!(server.get_matchmaker().stats().await.in_progress, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_out_of_range_coordinates_are_invalid_moves() {
        let (_server, addr) = start_server(ServerConfig::default()).await;
        let (mut black, _white, _) = started_pair(addr).await;

        black.send_text(r#"{"type":"move","row":18446744073709551616,"col":3}"#).await;
        black.expect_move_response(false, "invalid move").await;

        black.send_text(r#"{"type":"move","row":2,"col":1e30}"#).await;
        black.expect_move_response(false, "invalid move").await;

        black.play(-1, 3).await;
        black.expect_move_response(false, "invalid move").await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_repeat_join_while_waiting_is_rejected() {
        let (_server, addr) = start_server(ServerConfig::default()).await;
        let mut client = TestClient::connect(addr).await;

        client.send(json!({ "type": "join", "name": "ana" })).await;
        client.welcome().await;
        client.recv_kind("waiting").await;

        client.join().await;
        client.expect_error("already in a room").await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_direct_join_errors_close_connection() {
        let (_server, addr) = start_server(ServerConfig::default()).await;

        let mut lost = TestClient::connect(addr).await;
        lost.send(json!({ "type": "join", "room_id": 42 })).await;
        lost.expect_error("room not found").await;
        lost.expect_closed().await;

        let (_black, _white, room_id) = started_pair(addr).await;
        let mut late = TestClient::connect(addr).await;
        late.send(json!({ "type": "join", "room_id": room_id })).await;
        late.expect_error("room full").await;
        late.expect_closed().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_direct_join_pairs_with_host() {
        let (_server, addr) = start_server(ServerConfig::default()).await;

        let mut host = TestClient::connect(addr).await;
        host.join().await;
        let (_, room_id) = host.welcome().await;
        host.recv_kind("waiting").await;

        let mut guest = TestClient::connect(addr).await;
        guest.send(json!({ "type": "join", "room_id": room_id })).await;
        assert_eq!(guest.welcome().await, (Player::White, room_id));
        guest.recv_kind("game_start").await;
        host.recv_kind("game_start").await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_server_full() {
        let (_server, addr) = start_server(ServerConfig {
            max_connections: 1,
            ..Default::default()
        })
        .await;

        let mut first = TestClient::connect(addr).await;
        first.join().await;
        first.welcome().await;

        let mut second = TestClient::connect(addr).await;
        second.expect_error("server full").await;
        second.expect_closed().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_message_too_large() {
        let (_server, addr) = start_server(ServerConfig {
            max_message_size: 64,
            ..Default::default()
        })
        .await;

        let mut client = TestClient::connect(addr).await;
        let padding = "x".repeat(200);
        client.send(json!({ "type": "join", "name": padding })).await;
        client.expect_error("message too large").await;

        client.join().await;
        client.welcome().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_assign_on_connect() {
        let (_server, addr) = start_server(ServerConfig {
            assign_on_connect: true,
            ..Default::default()
        })
        .await;

        let mut black = TestClient::connect(addr).await;
        assert_eq!(black.welcome().await.0, Player::Black);
        black.recv_kind("waiting").await;

        let mut white = TestClient::connect(addr).await;
        assert_eq!(white.welcome().await.0, Player::White);
        white.recv_kind("game_start").await;
        black.recv_kind("game_start").await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_shutdown_closes_sessions() {
        let (server, addr) = start_server(ServerConfig::default()).await;
        let mut client = TestClient::connect(addr).await;
        client.join().await;
        client.welcome().await;
        client.recv_kind("waiting").await;

        server.shutdown().await.unwrap();
        client.expect_closed().await;

        let connections = server.get_connection_manager();
        eventually(|| {
            let connections = connections.clone();
            async move { connections.session_count().await == 0 }
        })
        .await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_shutdown_state_stops_accept_loop() {
        let server = create_server_with_config(ServerConfig {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            ..Default::default()
        });
        let listener = server.bind().await.unwrap();
        let state = ShutdownState::new();

        let trigger = state.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(100)).await;
            trigger.initiate_shutdown();
        });

        timeout(WAIT, server.serve(listener, Some(state.clone())))
            .await
            .expect("Server did not stop")
            .unwrap();
        assert!(state.is_shutdown_complete());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_server_config_defaults() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_address.to_string(), "127.0.0.1:5555");
        assert_eq!(config.max_connections, 1000);
        assert_eq!(config.max_message_size, 64 * 1024);
        assert!(!config.assign_on_connect);
    }
}
