//! game-caster-rs: emotional speech commentary for live game events.
//!
//! Reads JSON-lines events from stdin (one `{"kind": ..., "payload": ...}`
//! object per line) or replays a scripted match with `--demo`.

use clap::Parser;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use game_caster::backend::{EspeakBackend, LogBackend};
use game_caster::config::Config;
use game_caster::{CommentaryEngine, SpeechBackend};

#[derive(Parser, Debug)]
#[command(name = "game-caster-rs", about = "Emotional speech commentary for game events")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replay a scripted match instead of reading events from stdin
    #[arg(long)]
    demo: bool,

    /// Log utterances instead of speaking them
    #[arg(long)]
    no_audio: bool,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

/// One event per stdin line.
#[derive(Deserialize)]
struct EventLine {
    kind: String,
    #[serde(default)]
    payload: Value,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("game-caster-rs starting");

    let config = Config::load(args.config.as_deref());

    let backend: Arc<dyn SpeechBackend> = if args.no_audio || config.backend.kind == "log" {
        Arc::new(LogBackend)
    } else {
        Arc::new(EspeakBackend::new(&config.backend.espeak_binary))
    };

    let engine = CommentaryEngine::start(&config, backend);

    if args.demo {
        run_demo(&engine).await;
    } else {
        run_stdin_feed(&engine).await?;
    }

    engine.wait_for_speech().await;

    let stats = engine.stats();
    info!(
        "Session stats: {}",
        serde_json::to_string_pretty(&stats)?
    );

    engine.shutdown().await;
    Ok(())
}

/// Feed events from stdin until EOF.
///
/// Besides game events, two control kinds are handled here:
/// `silence_on` (optional `payload.duration` in seconds) and `silence_off`.
async fn run_stdin_feed(engine: &CommentaryEngine) -> Result<(), Box<dyn std::error::Error>> {
    info!("Reading events from stdin (one JSON object per line)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: EventLine = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping malformed event line: {e}");
                continue;
            }
        };

        match event.kind.as_str() {
            "silence_on" => {
                match event.payload.get("duration").and_then(Value::as_f64) {
                    Some(secs) => match Duration::try_from_secs_f64(secs) {
                        Ok(duration) => engine.enable_silence(Some(duration)),
                        Err(_) => warn!("Ignoring silence_on with invalid duration {secs}"),
                    },
                    None => engine.enable_silence(None),
                }
            }
            "silence_off" => engine.disable_silence(),
            kind => {
                if let Err(e) = engine.handle_event(kind, &event.payload) {
                    warn!("Rejected event: {e}");
                }
            }
        }
    }

    Ok(())
}

/// Scripted match sequence exercising priorities, silence, and stats.
async fn run_demo(engine: &CommentaryEngine) {
    info!("Running demo match");

    let script: &[(&str, Value)] = &[
        ("game_start", json!({})),
        ("kill", json!({"weapon": "AWP", "headshot": true})),
        ("double_kill", json!({})),
        ("low_health", json!({"current_health": 15})),
        ("low_ammo", json!({"weapon": "AK-47", "ammo_magazine": 2})),
        ("death", json!({"kd_ratio": 1.5})),
        ("round_end", json!({"team_won": true})),
        ("custom", json!({"text": "That was a round for the highlight reel."})),
    ];

    for (kind, payload) in script {
        if let Err(e) = engine.handle_event(kind, payload) {
            warn!("Rejected event: {e}");
        }
        engine.wait_for_speech().await;
    }

    // Silence window: the kill is suppressed, the health warning is not
    info!("Enabling silence for 5s");
    engine.enable_silence(Some(Duration::from_secs(5)));
    let _ = engine.handle_event("kill", &json!({"weapon": "pistol"}));
    let _ = engine.handle_event("low_health", &json!({"current_health": 8}));
    engine.wait_for_speech().await;
    engine.disable_silence();
    info!("Silence disabled");
}
