//! Core game server implementation.
//!
//! This module contains the main `GameServer` struct and its implementation,
//! tying together the listener, the session registry and the matchmaker.

use crate::{
    config::ServerConfig,
    connection::ConnectionManager,
    error::ServerError,
    rooms::Matchmaker,
    server::handlers::handle_connection,
    shutdown::ShutdownState,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

/// The core game server structure.
///
/// `GameServer` owns the WebSocket listener and the shared state every
/// connection handler works against.
///
/// # Architecture
///
/// * **Connection Management**: Session registry with admission limits
/// * **Matchmaking**: Room registry assigning sessions to two-player rooms
/// * **Accept Loop**: One spawned task per connection
pub struct GameServer {
    /// Server configuration settings
    config: Arc<ServerConfig>,

    /// Manager for client sessions
    connection_manager: Arc<ConnectionManager>,

    /// Registry of live rooms
    matchmaker: Arc<Matchmaker>,

    /// Channel for coordinating server shutdown
    shutdown_sender: broadcast::Sender<()>,
}

impl GameServer {
    /// Creates a new game server with the specified configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration parameters for server behavior
    ///
    /// # Returns
    ///
    /// A new `GameServer` instance ready to be started.
    pub fn new(config: ServerConfig) -> Self {
        let matchmaker = Arc::new(Matchmaker::new());
        let connection_manager = Arc::new(ConnectionManager::new(
            matchmaker.clone(),
            config.max_connections,
        ));
        let (shutdown_sender, _) = broadcast::channel(1);

        Self {
            config: Arc::new(config),
            connection_manager,
            matchmaker,
            shutdown_sender,
        }
    }

    /// Binds the configured address.
    ///
    /// Failing to bind is the only fatal server error.
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        TcpListener::bind(self.config.bind_address)
            .await
            .map_err(|e| ServerError::Network(format!("Failed to bind {}: {e}", self.config.bind_address)))
    }

    /// Starts the game server and begins accepting connections with graceful shutdown support.
    ///
    /// # Arguments
    ///
    /// * `shutdown_state` - Shared shutdown state for coordinating graceful shutdown
    pub async fn start_with_shutdown_state(&self, shutdown_state: ShutdownState) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        self.serve(listener, Some(shutdown_state)).await
    }

    /// Starts the game server and runs until [`GameServer::shutdown`] is called.
    pub async fn start(&self) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        self.serve(listener, None).await
    }

    /// Runs the accept loop on an already bound listener.
    ///
    /// The loop ends when the shutdown state is initiated, when
    /// [`GameServer::shutdown`] is called, or when accepting fails. Open
    /// sessions are then asked to close.
    pub async fn serve(
        &self,
        listener: TcpListener,
        shutdown_state: Option<ShutdownState>,
    ) -> Result<(), ServerError> {
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Network(format!("Listener has no local address: {e}")))?;
        info!("🚀 Starting game server on {}", local_addr);

        let mut shutdown_receiver = self.shutdown_sender.subscribe();

        let accept_loop = {
            let connection_manager = self.connection_manager.clone();
            let config = self.config.clone();

            async move {
                loop {
                    match listener.accept().await {
                        Ok((stream, addr)) => {
                            let connection_manager = connection_manager.clone();
                            let config = config.clone();

                            // Spawn individual connection handler
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, addr, connection_manager, config).await {
                                    error!("Connection error: {:?}", e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                            break;
                        }
                    }
                }
            }
        };

        let shutdown_watch = async {
            match &shutdown_state {
                Some(state) => state.initiated().await,
                None => std::future::pending::<()>().await,
            }
        };

        // Run until shutdown is initiated or internal shutdown signal
        tokio::select! {
            _ = accept_loop => {}
            _ = shutdown_watch => {
                info!("🛑 Accept loop stopping - shutdown initiated");
            }
            _ = shutdown_receiver.recv() => {
                info!("Internal shutdown signal received");
            }
        }

        info!("🧹 Performing server cleanup...");
        let closing = self.connection_manager.close_all("server shutting down").await;
        debug!("👋 Asked {} session(s) to close", closing);

        if let Some(state) = shutdown_state {
            state.complete_shutdown();
        }

        info!("Server stopped");
        Ok(())
    }

    /// Initiates server shutdown.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the shutdown signal was sent successfully.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        info!("🛑 Shutting down server...");
        let _ = self.shutdown_sender.send(());
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Gets a reference to the session registry.
    pub fn get_connection_manager(&self) -> Arc<ConnectionManager> {
        self.connection_manager.clone()
    }

    /// Gets a reference to the room registry.
    pub fn get_matchmaker(&self) -> Arc<Matchmaker> {
        self.matchmaker.clone()
    }
}
