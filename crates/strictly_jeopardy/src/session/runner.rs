//! Drives a session from a channel's message stream.

use super::error::SessionError;
use super::game::JeopardySession;
use super::leaderboard::Leaderboard;
use super::ports::{Announcement, Announcer, ChannelMessage, Clock, MessageSource, ScoringSink};
use super::types::{ClueReveal, GameOverReason, RoundOutcome, SessionState, Verdict};
use crate::answer::is_question_form;
use crate::board::{BoardView, is_selection_attempt};
use crate::config::GameConfig;
use derive_getters::Getters;
use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Final report of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct GameSummary {
    /// Session the game ran in.
    session_id: String,
    /// Why the game ended.
    reason: GameOverReason,
    /// Final standings.
    leaderboard: Leaderboard,
    /// Every clue played, in order.
    rounds: Vec<RoundOutcome>,
}

enum Selection {
    Opened(ClueReveal),
    TimedOut,
    Ended,
}

/// Runs one game: selection waits, guess windows, and announcements.
pub struct GameRunner {
    session: JeopardySession,
    config: GameConfig,
    messages: Arc<dyn MessageSource>,
    announcer: Arc<dyn Announcer>,
    clock: Arc<dyn Clock>,
    sink: Option<Arc<dyn ScoringSink>>,
}

impl GameRunner {
    /// Creates a runner for `session`.
    pub fn new(
        session: JeopardySession,
        config: GameConfig,
        messages: Arc<dyn MessageSource>,
        announcer: Arc<dyn Announcer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            session,
            config,
            messages,
            announcer,
            clock,
            sink: None,
        }
    }

    /// Reports score changes to `sink` as the game goes.
    pub fn with_sink(mut self, sink: Arc<dyn ScoringSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Plays until the board is exhausted, nobody picks a clue in time, or
    /// the session is stopped.
    ///
    /// Announcer and sink failures are logged and otherwise ignored.
    #[instrument(skip(self), fields(session = %self.session.id()))]
    pub async fn run(self) -> GameSummary {
        let stop = self.session.stop_token();
        let started = self.clock.now();
        let mut rounds = Vec::new();

        if let Some(example) = example_selection(&self.session.board_view()) {
            self.announce(Announcement::Welcome { example }).await;
        }

        while !self.session.state().is_over() {
            let reveal = match self.await_selection(&stop).await {
                Selection::Opened(reveal) => reveal,
                Selection::TimedOut => {
                    if let Err(error) = self.session.expire().await {
                        debug!(%error, "Session ended before the timeout was applied");
                    }
                    break;
                }
                Selection::Ended => break,
            };

            self.guess_window(reveal).await;

            if let Some(outcome) = self.session.close_round().await {
                self.record(&outcome).await;
                self.announce(Announcement::RoundResolved(outcome.clone()))
                    .await;
                rounds.push(outcome);
            }
        }

        let reason = match self.session.state() {
            SessionState::GameOver(reason) => reason,
            _ => GameOverReason::Stopped,
        };
        let leaderboard = self.session.leaderboard();
        if let Some(sink) = &self.sink
            && let Err(error) = sink.record_final(self.session.id(), &leaderboard).await
        {
            warn!(%error, "Failed to record final standings");
        }
        self.announce(Announcement::GameOver {
            reason,
            leaderboard: leaderboard.clone(),
        })
        .await;

        let elapsed = self.clock.now() - started;
        info!(
            %reason,
            rounds = rounds.len(),
            elapsed_secs = elapsed.num_seconds(),
            "Game finished"
        );
        GameSummary {
            session_id: self.session.id().to_string(),
            reason,
            leaderboard,
            rounds,
        }
    }

    /// Waits for a message that opens a clue, racing the stop signal and
    /// the selection timeout. A rejected choice is announced and restarts
    /// the window.
    async fn await_selection(&self, stop: &CancellationToken) -> Selection {
        let mut messages = self.messages.subscribe();
        self.announce(Announcement::Board(self.session.board_view()))
            .await;

        loop {
            let mut deadline = self.clock.sleep(self.config.selection_timeout());
            let choice = loop {
                let message = tokio::select! {
                    biased;
                    _ = stop.cancelled() => return Selection::Ended,
                    _ = &mut deadline => {
                        info!(
                            timeout = ?self.config.selection_timeout(),
                            "No clue selected in time"
                        );
                        return Selection::TimedOut;
                    }
                    message = messages.next() => message,
                };
                match message {
                    Some(message) if is_selection_attempt(&message.text) => break message,
                    Some(_) => continue,
                    None => {
                        self.source_closed().await;
                        return Selection::Ended;
                    }
                }
            };

            debug!(participant = %choice.participant, text = %choice.text, "Selection attempt");
            match self.session.select_clue(&choice.text).await {
                Ok(reveal) => return Selection::Opened(reveal),
                Err(SessionError::Selection(error)) => {
                    self.announce(Announcement::SelectionRejected { error })
                        .await;
                }
                Err(error) => {
                    debug!(%error, "Selection ignored");
                    return Selection::Ended;
                }
            }
        }
    }

    /// Feeds guesses to independent workers until the open clue resolves.
    async fn guess_window(&self, reveal: ClueReveal) {
        let Some(round) = self.session.round_token() else {
            return;
        };
        let mut messages = self.messages.subscribe();
        self.announce(Announcement::ClueRevealed(reveal)).await;

        let mut workers: JoinSet<Verdict> = JoinSet::new();
        loop {
            tokio::select! {
                biased;
                _ = round.cancelled() => break,
                Some(joined) = workers.join_next(), if !workers.is_empty() => {
                    log_verdict(joined);
                }
                message = messages.next() => match message {
                    Some(message) => self.dispatch(&mut workers, message),
                    None => {
                        self.source_closed().await;
                        break;
                    }
                },
            }
        }

        while let Some(joined) = workers.join_next().await {
            log_verdict(joined);
        }
    }

    fn dispatch(&self, workers: &mut JoinSet<Verdict>, message: ChannelMessage) {
        if *self.config.require_question_form() && !is_question_form(&message.text) {
            return;
        }
        let session = self.session.clone();
        workers.spawn(async move { session.submit_guess(message.into()).await });
    }

    async fn source_closed(&self) {
        info!("Message source closed, stopping session");
        if let Err(error) = self.session.stop().await {
            debug!(%error, "Session already ended");
        }
    }

    async fn record(&self, outcome: &RoundOutcome) {
        let (Some(sink), Some(delta)) = (&self.sink, outcome.delta()) else {
            return;
        };
        if let Err(error) = sink.record_delta(self.session.id(), &delta).await {
            warn!(%error, participant = %delta.participant, "Failed to record score");
        }
    }

    async fn announce(&self, announcement: Announcement) {
        if let Err(error) = self.announcer.announce(announcement).await {
            warn!(%error, "Announcement failed");
        }
    }
}

/// A "category for value" phrase naming the first available clue.
fn example_selection(board: &BoardView) -> Option<String> {
    board.categories.iter().find_map(|category| {
        category
            .slots
            .iter()
            .find(|slot| slot.available)
            .map(|slot| format!("{} for {}", category.name, slot.value))
    })
}

fn log_verdict(joined: Result<Verdict, tokio::task::JoinError>) {
    match joined {
        Ok(verdict) => debug!(?verdict, "Guess evaluated"),
        Err(error) => warn!(%error, "Guess worker failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CategoryView, SlotView};

    #[test]
    fn test_example_selection_skips_claimed_slots() {
        let board = BoardView {
            categories: vec![CategoryView {
                name: "SCIENCE".to_string(),
                slots: vec![
                    SlotView { value: 200, available: false },
                    SlotView { value: 400, available: true },
                ],
            }],
        };
        assert_eq!(
            example_selection(&board),
            Some("SCIENCE for 400".to_string())
        );
    }

    #[test]
    fn test_example_selection_empty_board() {
        assert_eq!(example_selection(&BoardView { categories: vec![] }), None);
    }
}
