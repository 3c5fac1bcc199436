//! Command-line interface for strictly_jeopardy.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Jeopardy - multiplayer trivia in your terminal
#[derive(Parser, Debug)]
#[command(name = "strictly_jeopardy")]
#[command(about = "Multiplayer trivia engine with a console transport", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a game on stdin/stdout; each line is `name: message`
    Play {
        /// Clue bank to draw the board from
        #[arg(short, long, default_value = "clues.toml")]
        bank: PathBuf,

        /// Game configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for board generation
        #[arg(long)]
        seed: Option<u64>,

        /// Channel name the session is registered under
        #[arg(long, default_value = "console")]
        channel: String,

        /// Print announcements as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// List the categories in a clue bank
    Categories {
        /// Clue bank to inspect
        #[arg(short, long, default_value = "clues.toml")]
        bank: PathBuf,
    },
}
