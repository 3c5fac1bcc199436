//! Session error types.

use super::types::SessionState;
use crate::board::SelectionError;
use derive_more::{Display, Error};
use tracing::instrument;

/// Why a skip vote was not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum VoteRejected {
    /// No clue is open.
    #[display("Cannot vote skip yet")]
    NotEligible,

    /// Only participants with a score may vote.
    #[display("You need a score to vote skip")]
    NoScore,

    /// One vote per participant per clue.
    #[display("You already voted")]
    AlreadyVoted,
}

impl std::error::Error for VoteRejected {}

/// Error returned by session operations.
///
/// None of these end the session; a wrong guess is not an error at all.
#[derive(Debug, Clone, PartialEq, Eq, Display, derive_more::From)]
pub enum SessionError {
    /// The selection message did not pick an available clue.
    #[display("{}", _0)]
    #[from]
    Selection(SelectionError),

    /// A skip vote was refused.
    #[display("Vote rejected: {}", _0)]
    #[from]
    VoteRejected(VoteRejected),

    /// The session has already ended.
    #[display("Session has already ended")]
    Stale,

    /// The session is in a phase that cannot accept this operation.
    #[display("Expected session state {} but it is {}", expected, actual)]
    WrongState {
        /// State the operation needs.
        expected: SessionState,
        /// State the session is in.
        actual: SessionState,
    },

    /// The channel already has a live session.
    #[display("A game is already in progress in channel {:?}", _0)]
    AlreadyRunning(String),
}

impl std::error::Error for SessionError {}

/// Failure reported by an external collaborator (announcer, scoring sink).
#[derive(Debug, Clone, Display, Error)]
#[display("Collaborator error: {} at {}:{}", message, file, line)]
pub struct CollaboratorError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl CollaboratorError {
    /// Creates a new collaborator error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
