//! Value types exchanged with a running session.

use chrono::{DateTime, Utc};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a participant.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Wraps an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A guess submitted while a clue is open. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, new)]
pub struct Guess {
    /// Who sent it.
    pub participant: ParticipantId,
    /// Raw message text.
    pub text: String,
    /// When the transport received it.
    pub received_at: DateTime<Utc>,
}

/// Phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum SessionState {
    /// Waiting for a "category for value" choice.
    SelectingCategory,
    /// A clue is revealed and guesses are being arbitrated.
    ClueOpen,
    /// The open clue was answered or skipped; outcome not yet collected.
    RoundResolved,
    /// The session has ended and accepts no further operations.
    GameOver(GameOverReason),
}

impl SessionState {
    /// True once the session has ended.
    pub fn is_over(self) -> bool {
        matches!(self, SessionState::GameOver(_))
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum GameOverReason {
    /// Every clue has been played.
    BoardExhausted,
    /// Nobody chose a clue within the selection window.
    NoResponse,
    /// An explicit stop was requested, or the message source closed.
    Stopped,
}

/// Result of arbitrating one guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// This guess won the clue and was credited.
    Won {
        /// Points credited.
        points: u32,
    },
    /// Evaluated and rejected; the clue stays open.
    Incorrect,
    /// Dropped without evaluation because the clue was already resolved,
    /// the session stopped, or no clue was open.
    Discarded,
}

/// Public face of a clue while it is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClueReveal {
    /// Category name.
    pub category: String,
    /// Point value.
    pub value: u32,
    /// Prompt text.
    pub text: String,
}

/// How a round ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// A participant answered correctly.
    Answered {
        /// The winning guess.
        guess: Guess,
        /// Points credited.
        points: u32,
    },
    /// Abandoned by vote; nobody was credited.
    Skipped,
    /// The session ended while the clue was open.
    Stopped,
}

/// Outcome of one clue, reported once the round is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundOutcome {
    /// The clue that was played.
    pub clue: ClueReveal,
    /// Canonical answer text, for revealing after a skip.
    pub answer: String,
    /// How it ended.
    pub resolution: Resolution,
}

impl RoundOutcome {
    /// The credited change, if someone won.
    pub fn delta(&self) -> Option<ScoreDelta> {
        match &self.resolution {
            Resolution::Answered { guess, points } => Some(ScoreDelta::new(
                guess.participant.clone(),
                i64::from(*points),
            )),
            Resolution::Skipped | Resolution::Stopped => None,
        }
    }
}

/// Points credited to a participant, for an external scoring sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, new)]
pub struct ScoreDelta {
    /// Who was credited.
    pub participant: ParticipantId,
    /// How many points.
    pub points: i64,
}

/// Result of an accepted skip vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    /// Votes cast for the open clue.
    pub votes: usize,
    /// Votes needed: participants holding a nonzero score.
    pub required: usize,
    /// Whether this vote abandoned the clue.
    pub passed: bool,
}
