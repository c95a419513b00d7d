//! Server configuration types and defaults.
//!
//! This module contains the server configuration structure and default values
//! used to initialize and customize the game server behavior.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Configuration structure for the game server.
///
/// Contains the network settings and connection limits the accept loop and
/// the per-connection handlers enforce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The socket address to bind the server to
    pub bind_address: SocketAddr,

    /// Maximum number of concurrent sessions; further connections receive
    /// `server full` and are closed
    pub max_connections: usize,

    /// Largest accepted text frame in bytes
    pub max_message_size: usize,

    /// Place sessions into matchmaking on accept instead of waiting for a
    /// `join` message
    pub assign_on_connect: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 5555)),
            max_connections: 1000,
            max_message_size: 64 * 1024, // 64KB
            assign_on_connect: false,
        }
    }
}
