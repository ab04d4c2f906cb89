//! Command-line probe for the shared audio manager
//!
//! Speaks a line of text against a running game server. Useful for checking
//! voices, the synthesis endpoints, and local audio output without opening
//! the games themselves.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use quizvox_audio::{
    AudioManager, AudioManagerConfig, PlaybackOptions, RodioOutput, SpeakCallbacks,
};
use quizvox_tts_http::HttpTtsClient;

#[derive(Parser, Debug)]
#[command(
    name = "quizvox",
    about = "Speak a line of text through the trivia game's TTS service"
)]
struct Args {
    /// Text to speak
    text: String,

    /// Base URL of the game server
    #[arg(long, env = "QUIZVOX_SERVER", default_value = "http://127.0.0.1:8000")]
    server: String,

    /// Voice to test (omit for the server's default voice)
    #[arg(long)]
    voice: Option<String>,

    /// Delivery instruction for the synthesis model
    #[arg(long)]
    prompt: Option<String>,

    /// Playback volume, 0.0 to 1.0
    #[arg(long)]
    volume: Option<f32>,
}

fn init_logging() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(log_level).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    let tts = Arc::new(HttpTtsClient::new(&args.server));
    let output = RodioOutput::new().context("opening audio output")?;
    let manager = AudioManager::new(tts, Box::new(output), AudioManagerConfig::default())
        .context("initializing audio manager")?;

    let options = PlaybackOptions {
        volume: args.volume,
    };
    let callbacks = SpeakCallbacks::new().on_start(|| tracing::info!("speaking"));

    manager
        .play_tts(
            &args.text,
            args.voice.as_deref(),
            args.prompt.as_deref(),
            &options,
            callbacks,
        )
        .await?;

    // play() resolves at playback start; hold the process open until the
    // clip drains.
    while manager.is_playing() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    Ok(())
}
