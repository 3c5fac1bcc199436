//! Game sessions: arbitration, skip votes, the game loop, and collaborators.

mod broadcast;
mod error;
mod game;
mod leaderboard;
mod ports;
mod registry;
mod runner;
mod types;

pub use broadcast::BroadcastSource;
pub use error::{CollaboratorError, SessionError, VoteRejected};
pub use game::JeopardySession;
pub use leaderboard::{Leaderboard, Standing};
pub use ports::{
    Announcement, Announcer, ChannelMessage, Clock, MessageSource, ScoringSink, SystemClock,
};
pub use registry::SessionRegistry;
pub use runner::{GameRunner, GameSummary};
pub use types::{
    ClueReveal, GameOverReason, Guess, ParticipantId, Resolution, RoundOutcome, ScoreDelta,
    SessionState, Verdict, VoteTally,
};
