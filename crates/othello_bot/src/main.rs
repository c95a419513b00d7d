//! # Othello Bot - Autonomous WebSocket Player
//!
//! Connects one or more automated players to an Othello server, joins
//! matchmaking and plays each game with a configurable search strategy.
//!
//! ```bash
//! # Two minimax bots playing each other three times
//! othello_bot --bots 2 --games 3 --strategy hard --depth 4
//! ```

mod player;

use clap::Parser;
use futures::{SinkExt, StreamExt};
use othello_ai::{SearchAi, Strategy, DEFAULT_SEARCH_DEPTH};
use othello_core::{ClientMessage, ServerMessage};
use player::{BotPlayer, Reaction};
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

type BotError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser, Debug, Clone)]
#[command(name = "othello-bot")]
#[command(about = "Autonomous Othello player for the WebSocket server")]
struct Args {
    /// Server WebSocket URL
    #[arg(short, long, default_value = "ws://127.0.0.1:5555")]
    url: String,

    /// Move selection: random|easy, greedy|medium, minimax|hard
    #[arg(short, long, default_value_t = Strategy::Minimax)]
    strategy: Strategy,

    /// Minimax search depth (clamped to 1..=8)
    #[arg(short, long, default_value_t = DEFAULT_SEARCH_DEPTH)]
    depth: u32,

    /// Base think time before each move in milliseconds
    #[arg(short, long, default_value = "300")]
    think_ms: u64,

    /// Display name; bots get a numbered suffix
    #[arg(short, long)]
    name: Option<String>,

    /// Join this room directly instead of matchmaking
    #[arg(short, long)]
    room: Option<u64>,

    /// Number of simultaneous bots
    #[arg(short, long, default_value = "1")]
    bots: u32,

    /// Games each bot plays before disconnecting
    #[arg(short, long, default_value = "1")]
    games: u32,
}

fn encode(message: &ClientMessage) -> Result<Message, BotError> {
    Ok(Message::Text(serde_json::to_string(message)?.into()))
}

/// Think time with up to 50% random jitter.
fn think_delay(base_ms: u64) -> Duration {
    if base_ms == 0 {
        return Duration::ZERO;
    }
    let jitter = rand::thread_rng().gen_range(0..=base_ms / 2);
    Duration::from_millis(base_ms + jitter)
}

/// Runs one bot until it has played its games or the server hangs up.
async fn run_bot(mut bot: BotPlayer, args: Args) -> Result<(), BotError> {
    let (ws_stream, _) = connect_async(args.url.as_str()).await?;
    info!("✅ {} connected to {}", bot.name(), args.url);
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    ws_sender.send(encode(&bot.join_request(args.room))?).await?;

    while let Some(frame) = ws_receiver.next().await {
        let text = match frame? {
            Message::Text(text) => text,
            Message::Close(frame) => {
                info!("🔌 {} connection closed by server: {:?}", bot.name(), frame);
                break;
            }
            _ => continue,
        };

        let message: ServerMessage = match serde_json::from_str(text.as_str()) {
            Ok(message) => message,
            Err(e) => {
                warn!("⚠️ {} could not decode {}: {}", bot.name(), text.as_str(), e);
                continue;
            }
        };
        debug!("📨 {} received {}", bot.name(), message.kind());

        match bot.on_message(message) {
            Reaction::Wait => {}
            Reaction::Play(mv) => {
                sleep(think_delay(args.think_ms)).await;
                debug!("📤 {} plays {}", bot.name(), mv);
                ws_sender.send(encode(&ClientMessage::play(mv.row(), mv.col()))?).await?;
            }
            Reaction::Rejoin => {
                // Matchmaking only; a direct room is single-use.
                ws_sender.send(encode(&bot.join_request(None))?).await?;
            }
            Reaction::Done => {
                let _ = ws_sender.close().await;
                break;
            }
        }
    }

    let record = bot.record();
    info!(
        "📊 {} final record: {} won, {} lost, {} drawn, {} abandoned",
        bot.name(),
        record.wins,
        record.losses,
        record.draws,
        record.abandoned
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BotError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let base_name = args
        .name
        .clone()
        .unwrap_or_else(|| format!("bot-{}", &Uuid::new_v4().simple().to_string()[..8]));

    info!("🚀 Starting {} Othello bot(s)", args.bots);
    info!("   • Server: {}", args.url);
    info!("   • Strategy: {} (depth {})", args.strategy, args.depth);
    info!("   • Games per bot: {}", args.games);

    let mut handles = Vec::new();
    for i in 0..args.bots.max(1) {
        let name = if args.bots > 1 {
            format!("{base_name}-{}", i + 1)
        } else {
            base_name.clone()
        };
        let bot = BotPlayer::new(name, SearchAi::new(args.strategy, args.depth), args.games);
        let args = args.clone();

        handles.push(tokio::spawn(async move {
            let name = bot.name().to_string();
            if let Err(e) = run_bot(bot, args).await {
                error!("❌ {} failed: {}", name, e);
            }
        }));

        // Stagger connections so bots pair in arrival order
        sleep(Duration::from_millis(100)).await;
    }

    for handle in handles {
        let _ = handle.await;
    }

    info!("✅ All bots finished");
    Ok(())
}
