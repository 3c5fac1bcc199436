//! Strictly Jeopardy - console game
//!
//! Plays a trivia game over stdin/stdout so the engine can be tried without
//! a chat transport.

#![warn(missing_docs)]

mod cli;
mod console;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use console::{ConsoleAnnouncer, ConsoleInput, render_scores};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::Arc;
use strictly_jeopardy::{
    BroadcastSource, ChannelMessage, Clock, ClueBank, GameConfig, GameRunner, JeopardySession,
    SessionRegistry, SystemClock,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;

/// Buffered messages per subscriber before a slow game loop starts skipping.
const MESSAGE_BUFFER: usize = 256;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the game.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,strictly_jeopardy=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Play {
            bank,
            config,
            seed,
            channel,
            json,
        } => play(bank, config, seed, channel, json).await,
        Command::Categories { bank } => list_categories(bank),
    }
}

/// Print the categories of a clue bank
fn list_categories(bank: PathBuf) -> Result<()> {
    let bank = ClueBank::from_file(&bank)?;
    for name in bank.categories() {
        println!("{name}");
    }
    info!(clues = bank.len(), "Clue bank listed");
    Ok(())
}

/// Run one game against stdin
#[instrument]
async fn play(
    bank: PathBuf,
    config: Option<PathBuf>,
    seed: Option<u64>,
    channel: String,
    json: bool,
) -> Result<()> {
    let config = match config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::default(),
    };
    let bank = ClueBank::from_file(&bank)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let board = bank.generate(*config.categories(), &mut rng)?;

    let registry = SessionRegistry::new();
    let session = JeopardySession::new(channel, board);
    registry.try_insert(session.clone())?;

    let source = BroadcastSource::new(MESSAGE_BUFFER);
    let clock = SystemClock;
    let runner = GameRunner::new(
        session.clone(),
        config,
        Arc::new(source.clone()),
        Arc::new(ConsoleAnnouncer::new(json)),
        Arc::new(clock),
    );
    let game = tokio::spawn(runner.run());

    let stop = session.stop_token();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = stop.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            debug!("Input closed");
            if let Err(error) = session.stop().await {
                debug!(%error, "Session already ended");
            }
            break;
        };
        let Some(input) = ConsoleInput::parse(&line) else {
            continue;
        };

        match input {
            ConsoleInput::Stop => {
                if let Err(error) = session.stop().await {
                    println!("{error}");
                }
            }
            ConsoleInput::Skip(participant) => match session.vote_skip(participant).await {
                Ok(tally) if !tally.passed => {
                    println!("{}/{} votes required to skip", tally.votes, tally.required);
                }
                Ok(_) => {}
                Err(error) => println!("{error}"),
            },
            ConsoleInput::Scores => println!("{}", render_scores(&session.leaderboard())),
            ConsoleInput::Say(participant, text) => {
                let delivered =
                    source.publish(ChannelMessage::new(participant, text, clock.now()));
                if delivered == 0 {
                    warn!("Nobody is listening for messages right now");
                }
            }
        }
    }

    let summary = game.await?;
    registry.remove(session.id());
    info!(
        reason = %summary.reason(),
        rounds = summary.rounds().len(),
        "Session closed"
    );
    Ok(())
}
