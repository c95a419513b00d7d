//! WebSocket listener and per-connection handling.
//!
//! [`GameServer`] owns the accept loop; each accepted socket is driven by
//! `handlers::handle_connection` on its own task.

pub mod core;
mod handlers;

pub use core::GameServer;
