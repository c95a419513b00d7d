//! Main application logic and lifecycle management.
//!
//! This module contains the `Application` struct that orchestrates server
//! startup, statistics reporting, and shutdown.

use crate::{
    cli::CliArgs,
    config::AppConfig,
    logging::display_banner,
    signals::{setup_signal_handlers, setup_signal_handlers_silent},
};
use game_server::{ConnectionManager, GameServer, Matchmaker, ShutdownState};
use tokio::time::{interval, sleep, timeout, Duration};
use tracing::{error, info, warn};

/// How long the accept loop gets to close sessions after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(8);

/// Owns the loaded configuration and the game server.
///
/// # Architecture
///
/// * **Configuration Management**: Loads and validates configuration from files and CLI
/// * **Server Orchestration**: Runs the game server on a background task
/// * **Monitoring**: Periodic room and session statistics
/// * **Graceful Shutdown**: Handles termination signals and cleanup procedures
pub struct Application {
    /// Loaded application configuration
    config: AppConfig,
    /// Game server instance
    server: GameServer,
}

impl Application {
    /// Creates a new application instance.
    ///
    /// # Arguments
    ///
    /// * `args` - Parsed command-line arguments
    ///
    /// # Process
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    /// 4. Display startup banner
    /// 5. Initialize game server with configuration
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        // Apply CLI overrides
        if let Some(bind_address) = args.bind_address {
            config.server.bind_address = bind_address;
        }

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if args.assign_on_connect {
            config.matchmaking.assign_on_connect = true;
        }

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        }
        info!("✅ Configuration loaded and validated successfully");

        display_banner();

        let server = GameServer::new(config.to_server_config()?);
        info!("📂 Config: {}", args.config_path.display());

        Ok(Self { config, server })
    }

    /// Runs the server until a termination signal arrives, then shuts it
    /// down gracefully.
    ///
    /// A second signal during shutdown exits the process immediately.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!("🌟 Starting Othello server application");
        self.log_configuration_summary();

        let matchmaker = self.server.get_matchmaker();
        let connections = self.server.get_connection_manager();
        let config = self.config.clone();

        let shutdown_state = ShutdownState::new();

        let server_handle = {
            let server = self.server;
            let shutdown_state = shutdown_state.clone();
            tokio::spawn(async move {
                match server.start_with_shutdown_state(shutdown_state).await {
                    Ok(()) => info!("✅ Server completed successfully"),
                    Err(e) => {
                        error!("❌ Server error: {:?}", e);
                        std::process::exit(1);
                    }
                }
            })
        };

        let monitoring_handle = (config.logging.stats_interval_secs > 0).then(|| {
            let matchmaker = matchmaker.clone();
            let connections = connections.clone();
            let period = Duration::from_secs(config.logging.stats_interval_secs);

            tokio::spawn(async move {
                let mut ticker = interval(period);
                // The first tick completes immediately.
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    log_statistics("📊 Arena Health", &matchmaker, &connections).await;
                }
            })
        });

        info!("✅ Othello server is now running!");
        info!("🎮 Ready to accept connections on {}", config.server.bind_address);
        info!("🛑 Press Ctrl+C to gracefully shutdown");

        let signal_shutdown_state = setup_signal_handlers().await?;

        // merciless shutdown
        tokio::spawn(async move {
            if let Err(e) = setup_signal_handlers_silent().await {
                error!("Failed to set up merciless shutdown signal handler: {e}");
                return;
            }

            warn!("Shutdown handler received again! I'll make this quick.");
            std::process::exit(1);
        });

        if signal_shutdown_state.is_shutdown_initiated() {
            shutdown_state.initiate_shutdown();
        }

        info!("🛑 Shutdown signal received, beginning graceful shutdown...");
        if let Some(handle) = monitoring_handle {
            handle.abort();
        }

        info!("⏳ Waiting for the accept loop to close open sessions...");
        match timeout(SHUTDOWN_GRACE, server_handle).await {
            Ok(Ok(())) => info!("✅ Server task completed gracefully"),
            Ok(Err(e)) => error!("❌ Server task failed: {}", e),
            Err(_) => warn!("⏰ Server task did not complete within timeout, proceeding with cleanup"),
        }

        // Give writer tasks a moment to flush close frames
        sleep(Duration::from_millis(500)).await;

        log_statistics("📊 Final Statistics", &matchmaker, &connections).await;
        info!("👋 Othello server shutdown complete");
        Ok(())
    }

    /// Logs the configuration summary at startup.
    fn log_configuration_summary(&self) {
        info!("📋 Configuration Summary:");
        info!("  🌐 Bind address: {}", self.config.server.bind_address);
        info!("  👥 Max connections: {}", self.config.server.max_connections);
        info!("  📏 Max message size: {} bytes", self.config.server.max_message_size);
        info!(
            "  🎲 Matchmaking: {}",
            if self.config.matchmaking.assign_on_connect {
                "assign on connect"
            } else {
                "on join"
            }
        );
    }
}

async fn log_statistics(title: &str, matchmaker: &Matchmaker, connections: &ConnectionManager) {
    let stats = matchmaker.stats().await;
    let sessions = connections.session_count().await;
    info!(
        "{} - {} sessions | {} rooms ({} waiting, {} in progress, {} finished)",
        title, sessions, stats.rooms, stats.waiting, stats.in_progress, stats.finished
    );
}
