//! Convenience constructors for the game server.

use crate::{config::ServerConfig, server::GameServer};

/// Creates a game server with default configuration: loopback on port
/// 5555, matchmaking on `join`.
///
/// # Example
///
/// ```rust
/// # #[tokio::main]
/// # async fn main() {
/// use game_server::create_server;
///
/// let server = create_server();
/// assert_eq!(server.config().bind_address.port(), 5555);
/// # }
/// ```
pub fn create_server() -> GameServer {
    GameServer::new(ServerConfig::default())
}

/// Creates a game server with custom configuration.
///
/// # Arguments
///
/// * `config` - A `ServerConfig` instance with desired settings
///
/// # Example
///
/// ```rust
/// # #[tokio::main]
/// # async fn main() {
/// use game_server::{create_server_with_config, ServerConfig};
///
/// let config = ServerConfig {
///     bind_address: "0.0.0.0:9000".parse().unwrap(),
///     assign_on_connect: true,
///     ..Default::default()
/// };
///
/// let server = create_server_with_config(config);
/// # }
/// ```
pub fn create_server_with_config(config: ServerConfig) -> GameServer {
    GameServer::new(config)
}
