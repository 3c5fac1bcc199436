//! Strictly Jeopardy - a multiplayer trivia engine
//!
//! Players in a chat channel pick clues by typing "category for value",
//! then race to answer. Every guess goes through one arbitration gate so
//! each clue has at most one winner.
//!
//! # Architecture
//!
//! - **Answer**: normalization, accepted-answer derivation, fuzzy matching
//! - **Board**: clues, categories, selection parsing, TOML clue banks
//! - **Session**: the game state machine, skip votes, and the game loop
//! - **Config**: tunables loaded from TOML
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_jeopardy::{
//!     BroadcastSource, ClueBank, GameConfig, GameRunner, JeopardySession, SystemClock,
//! };
//!
//! # async fn example(announcer: Arc<dyn strictly_jeopardy::Announcer>) -> anyhow::Result<()> {
//! let bank = ClueBank::from_file("clues.toml")?;
//! let board = bank.generate(2, &mut rand::rng())?;
//! let session = JeopardySession::new("general", board);
//!
//! let source = BroadcastSource::new(64);
//! let runner = GameRunner::new(
//!     session,
//!     GameConfig::default(),
//!     Arc::new(source.clone()),
//!     announcer,
//!     Arc::new(SystemClock),
//! );
//! let summary = runner.run().await;
//! println!("{:?}", summary.reason());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod answer;
mod board;
mod config;
mod session;

// Crate-level exports - Answer matching
pub use answer::{
    AnswerSpec, SatisfactionRule, is_question_form, levenshtein, matches, normalize,
    normalize_guess, tolerance, within_tolerance,
};

// Crate-level exports - Board
pub use board::{
    BankEntry, BankError, BoardError, BoardView, Category, CategoryView, Clue, ClueBank,
    ClueBoard, ClueKey, SelectionError, SlotView, is_selection_attempt,
};

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig};

// Crate-level exports - Sessions
pub use session::{
    Announcement, Announcer, BroadcastSource, ChannelMessage, Clock, ClueReveal,
    CollaboratorError, GameOverReason, GameRunner, GameSummary, Guess, JeopardySession,
    Leaderboard, MessageSource, ParticipantId, Resolution, RoundOutcome, ScoreDelta,
    ScoringSink, SessionError, SessionRegistry, SessionState, Standing, SystemClock, Verdict,
    VoteRejected, VoteTally,
};
