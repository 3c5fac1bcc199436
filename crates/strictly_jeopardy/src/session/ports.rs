//! Collaborator interfaces the engine is driven through.
//!
//! The engine never touches a transport, a database, or the wall clock
//! directly; it talks to these traits.

use super::error::CollaboratorError;
use super::leaderboard::Leaderboard;
use super::types::{ClueReveal, GameOverReason, Guess, ParticipantId, RoundOutcome, ScoreDelta};
use crate::board::{BoardView, SelectionError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_new::new;
use futures::stream::BoxStream;
use serde::Serialize;
use std::time::Duration;

/// One chat message from the channel a session is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, new)]
pub struct ChannelMessage {
    /// Sender.
    pub participant: ParticipantId,
    /// Message text.
    pub text: String,
    /// Receive time.
    pub received_at: DateTime<Utc>,
}

impl From<ChannelMessage> for Guess {
    fn from(message: ChannelMessage) -> Self {
        Guess::new(message.participant, message.text, message.received_at)
    }
}

/// Produces the message stream of one channel.
///
/// Each call to [`subscribe`](MessageSource::subscribe) yields a fresh,
/// unbounded stream starting at the next message; dropping the stream
/// unsubscribes.
pub trait MessageSource: Send + Sync {
    /// Starts receiving messages.
    fn subscribe(&self) -> BoxStream<'static, ChannelMessage>;
}

/// Something the transport should render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Announcement {
    /// Game start, with an example selection such as "SCIENCE for 200".
    Welcome {
        /// Example selection phrase.
        example: String,
    },
    /// The board before a selection.
    Board(BoardView),
    /// A selection did not resolve; the players are prompted again.
    SelectionRejected {
        /// Why.
        error: SelectionError,
    },
    /// A clue is open for guessing.
    ClueRevealed(ClueReveal),
    /// A clue was answered, skipped, or interrupted.
    RoundResolved(RoundOutcome),
    /// The session ended.
    GameOver {
        /// Why it ended.
        reason: GameOverReason,
        /// Final scores.
        leaderboard: Leaderboard,
    },
}

/// Renders announcements to the channel.
#[async_trait]
pub trait Announcer: Send + Sync {
    /// Delivers one announcement.
    async fn announce(&self, announcement: Announcement) -> Result<(), CollaboratorError>;
}

/// Time source and delay primitive.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;

    /// Completes after `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Receives score changes for persistence outside the engine.
#[async_trait]
pub trait ScoringSink: Send + Sync {
    /// Called when a clue is won.
    async fn record_delta(&self, session_id: &str, delta: &ScoreDelta) -> Result<(), CollaboratorError>;

    /// Called once when the session ends.
    async fn record_final(
        &self,
        _session_id: &str,
        _leaderboard: &Leaderboard,
    ) -> Result<(), CollaboratorError> {
        Ok(())
    }
}
