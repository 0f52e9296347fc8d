//! MATCHRS - headless match-three runner
//!
//! Autoplays a session with the first available swap each turn and prints
//! what the engine reports.

use anyhow::{Context, Result};
use clap::Parser;
use matchrs::matcher::find_swap;
use matchrs::{Game, GameMode, Settings, TurnEvent, TurnOutcome};
use std::path::PathBuf;
use std::time::Duration;

/// Autoplay a match-three session and print the turn events.
#[derive(Debug, Parser)]
#[command(name = "matchrs", version, about)]
struct Args {
    /// Game mode: easy (6x6) or normal (8x8)
    #[arg(short, long, default_value = "normal")]
    mode: GameMode,

    /// Seed for the piece source; random if not set
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop after this many swaps, even if time remains
    #[arg(long, default_value = "50", value_name = "N")]
    moves: u32,

    /// Settings file to use instead of the default location
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print each event as a JSON line
    #[arg(long)]
    json: bool,

    /// Write the effective settings back to the settings file and exit
    #[arg(long)]
    write_config: bool,

    /// Simulated time spent on each move, in milliseconds
    #[arg(long, default_value = "1500", value_name = "MS")]
    think_ms: u64,
}

/// Get the matchrs temp directory, creating it if needed
fn matchrs_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("matchrs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> Result<()> {
    let args = Args::parse();

    let session_id: u32 = rand::random();
    let log_dir = matchrs_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("matchrs=debug".parse()?),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "MATCHRS starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let settings = match &args.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("failed to load settings")?;

    if args.write_config {
        let path = match &args.config {
            Some(path) => {
                settings.save_to(path)?;
                path.clone()
            }
            None => settings.save()?,
        };
        println!("Settings written to {}", path.display());
        return Ok(());
    }

    let mut game = match args.seed {
        Some(seed) => Game::with_seed(settings, args.mode, seed),
        None => Game::new(settings, args.mode),
    }
    .context("failed to start game")?;

    if args.json {
        println!("{}", serde_json::json!({ "type": "board", "rows": &game.board }));
    } else {
        println!("{} mode: {}", args.mode.name(), args.mode.description());
        println!("{}", game.board);
    }

    let think = Duration::from_millis(args.think_ms);
    for turn in 1..=args.moves {
        let Some((a, b)) = find_swap(&game.board) else {
            tracing::info!("No swap left on the board after {} turns", turn - 1);
            if !args.json {
                println!("No moves left");
            }
            break;
        };

        let outcome = game.request_swap(a, b);
        match &outcome {
            TurnOutcome::Completed(events) => {
                tracing::debug!(
                    "Turn {}: {}",
                    turn,
                    events.iter().map(TurnEvent::name).collect::<Vec<_>>().join(", ")
                );
                if args.json {
                    for event in events {
                        println!("{}", serde_json::to_string(event)?);
                    }
                } else {
                    print_turn(turn, a, b, events);
                }
            }
            TurnOutcome::Rejected(reason) => {
                tracing::warn!("Swap {} <-> {} rejected: {:?}", a, b, reason);
            }
        }

        if game.advance(think).is_some() {
            break;
        }
    }

    let result = game.finish();
    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "type": "game_over",
                "score": result.score,
                "level": result.level,
                "high_score": result.high_score,
                "new_high_score": result.new_high_score,
                "cleared": result.cleared,
                "board": &game.board,
            })
        );
    } else {
        println!("{}", game.board);
        println!("Final Score: {}", result.score);
        println!(
            "Level: {} ({:.0}% to next) | Time left: {}",
            result.level,
            game.score.level_progress() * 100.0,
            game.mode_state.format_remaining()
        );
        if result.cleared {
            println!("Stage cleared!");
        }
    }

    tracing::info!("MATCHRS exiting, score={}", result.score);
    Ok(())
}

/// One line per turn plus the notable events
fn print_turn(turn: u32, a: matchrs::Coord, b: matchrs::Coord, events: &[TurnEvent]) {
    let mut points = 0;
    let mut passes = 0;
    for event in events {
        match event {
            TurnEvent::Cleared { score_delta, .. } => {
                points += score_delta;
                passes += 1;
            }
            TurnEvent::Detonated { coord, kind } => {
                println!("    {} detonated at {}", kind.name(), coord);
            }
            TurnEvent::SpecialSpawned { coord, kind, .. } => {
                println!("    {} created at {}", kind.name(), coord);
            }
            TurnEvent::LevelUp { level } => println!("    Level {}!", level),
            TurnEvent::CascadeLimitReached { passes } => {
                println!("    Cascade stopped after {} passes", passes);
            }
            _ => {}
        }
    }
    println!("Turn {:>3}: {} <-> {}  +{} ({} passes)", turn, a, b, points, passes);
}
