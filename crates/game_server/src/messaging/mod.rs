//! Message handling and routing for client-server communication.
//!
//! This module dispatches decoded protocol messages from a session to the
//! matchmaker and to the session's room.

pub mod router;

pub use router::{handle_join, route_client_message};
