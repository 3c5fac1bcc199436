//! The per-channel game session and its arbitration gate.
//!
//! Every mutation of scores, votes and the open clue happens while holding
//! one `tokio::sync::Mutex`. Readers use `watch` snapshots and never touch
//! the gate.

use super::error::{SessionError, VoteRejected};
use super::leaderboard::Leaderboard;
use super::types::{
    ClueReveal, GameOverReason, Guess, ParticipantId, Resolution, RoundOutcome, SessionState,
    Verdict, VoteTally,
};
use crate::board::{BoardView, ClueBoard, ClueKey, SelectionError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// State guarded by the arbitration gate.
#[derive(Debug)]
struct Arbiter {
    board: ClueBoard,
    scores: HashMap<ParticipantId, i64>,
    round: Option<OpenRound>,
    state: SessionState,
    next_round: u64,
}

#[derive(Debug)]
struct OpenRound {
    id: u64,
    key: ClueKey,
    votes: HashSet<ParticipantId>,
    token: CancellationToken,
    resolution: Option<Resolution>,
}

/// Identifies the open clue to workers that have not yet entered the gate.
#[derive(Debug, Clone)]
struct RoundTicket {
    id: u64,
    token: CancellationToken,
}

#[derive(Debug)]
struct Inner {
    id: String,
    gate: Mutex<Arbiter>,
    stop: CancellationToken,
    state_tx: watch::Sender<SessionState>,
    scores_tx: watch::Sender<Leaderboard>,
    board_tx: watch::Sender<BoardView>,
    round_tx: watch::Sender<Option<RoundTicket>>,
}

/// One trivia game bound to one channel.
///
/// Cheap to clone; clones share the same game. Guess workers, the game loop
/// and status queries can all hold a handle at once.
#[derive(Debug, Clone)]
pub struct JeopardySession {
    inner: Arc<Inner>,
}

impl JeopardySession {
    /// Starts a session in [`SessionState::SelectingCategory`].
    #[instrument(skip(board), fields(categories = board.categories().len()))]
    pub fn new(id: impl Into<String> + std::fmt::Debug, board: ClueBoard) -> Self {
        let id = id.into();
        let state = if board.is_exhausted() {
            SessionState::GameOver(GameOverReason::BoardExhausted)
        } else {
            SessionState::SelectingCategory
        };
        let stop = CancellationToken::new();
        if state.is_over() {
            stop.cancel();
        }
        info!(session = %id, %state, remaining = board.remaining(), "Session created");

        let inner = Inner {
            id,
            state_tx: watch::Sender::new(state),
            scores_tx: watch::Sender::new(Leaderboard::default()),
            board_tx: watch::Sender::new(board.view()),
            round_tx: watch::Sender::new(None),
            stop,
            gate: Mutex::new(Arbiter {
                board,
                scores: HashMap::new(),
                round: None,
                state,
                next_round: 1,
            }),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Session identifier, usually the channel id.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Current phase.
    pub fn state(&self) -> SessionState {
        *self.inner.state_tx.borrow()
    }

    /// Subscribes to phase changes.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    /// Score snapshot, highest first. Never blocks on the gate.
    pub fn leaderboard(&self) -> Leaderboard {
        self.inner.scores_tx.borrow().clone()
    }

    /// Board snapshot. Never blocks on the gate.
    pub fn board_view(&self) -> BoardView {
        self.inner.board_tx.borrow().clone()
    }

    /// Token cancelled when the session ends for any reason.
    pub fn stop_token(&self) -> CancellationToken {
        self.inner.stop.clone()
    }

    /// Token of the open clue, cancelled when it is won, skipped or stopped.
    pub fn round_token(&self) -> Option<CancellationToken> {
        self.inner
            .round_tx
            .borrow()
            .as_ref()
            .map(|ticket| ticket.token.clone())
    }

    /// Opens the clue named by a free-text choice such as "science for 200".
    ///
    /// # Errors
    ///
    /// [`SessionError::Selection`] when the message does not resolve to an
    /// available clue (the session stays in `SelectingCategory`),
    /// [`SessionError::WrongState`] when a clue is already open, and
    /// [`SessionError::Stale`] after the game has ended.
    #[instrument(skip(self), fields(session = %self.inner.id))]
    pub async fn select_clue(&self, message: &str) -> Result<ClueReveal, SessionError> {
        let mut arbiter = self.inner.gate.lock().await;
        expect_state(arbiter.state, SessionState::SelectingCategory)?;

        let key = arbiter.board.select(message).inspect_err(|error| {
            debug!(%error, "Selection rejected");
        })?;
        let Some(clue) = arbiter.board.clue(key) else {
            return Err(SelectionError::WrongCategory.into());
        };
        let reveal = ClueReveal {
            category: clue.category().clone(),
            value: clue.value(),
            text: clue.text().clone(),
        };

        let id = arbiter.next_round;
        arbiter.next_round += 1;
        let token = self.inner.stop.child_token();
        arbiter.round = Some(OpenRound {
            id,
            key,
            votes: HashSet::new(),
            token: token.clone(),
            resolution: None,
        });
        arbiter.state = SessionState::ClueOpen;

        self.inner
            .round_tx
            .send_replace(Some(RoundTicket { id, token }));
        self.inner.state_tx.send_replace(SessionState::ClueOpen);
        info!(
            round = id,
            category = %reveal.category,
            value = reveal.value,
            "Clue opened"
        );
        Ok(reveal)
    }

    /// Arbitrates one guess against the open clue.
    ///
    /// Waits for the gate unless the clue is resolved first, in which case
    /// the guess is discarded unevaluated. At most one guess per clue is
    /// ever [`Verdict::Won`]; ties go to whoever acquires the gate first.
    #[instrument(
        skip(self, guess),
        fields(session = %self.inner.id, participant = %guess.participant)
    )]
    pub async fn submit_guess(&self, guess: Guess) -> Verdict {
        let Some(ticket) = self.inner.round_tx.borrow().clone() else {
            debug!("No clue open, guess discarded");
            return Verdict::Discarded;
        };

        let mut arbiter = tokio::select! {
            biased;
            _ = ticket.token.cancelled() => {
                debug!(round = ticket.id, "Round resolved before gate, guess discarded");
                return Verdict::Discarded;
            }
            arbiter = self.inner.gate.lock() => arbiter,
        };

        // The round may have been resolved while this worker was queued.
        if ticket.token.is_cancelled() {
            debug!(round = ticket.id, "Round resolved while queued, guess discarded");
            return Verdict::Discarded;
        }
        let Arbiter {
            board,
            scores,
            round,
            state,
            ..
        } = &mut *arbiter;
        let Some(open) = round
            .as_mut()
            .filter(|r| r.id == ticket.id && r.resolution.is_none())
        else {
            return Verdict::Discarded;
        };
        let Some(clue) = board.clue(open.key) else {
            return Verdict::Discarded;
        };

        if !clue.check(&guess.text) {
            debug!(round = open.id, "Incorrect guess");
            return Verdict::Incorrect;
        }

        let points = clue.value();
        board.claim(open.key);
        *scores.entry(guess.participant.clone()).or_insert(0) += i64::from(points);
        info!(round = open.id, points, "Clue won");
        open.resolution = Some(Resolution::Answered { guess, points });
        open.token.cancel();
        *state = SessionState::RoundResolved;

        self.inner
            .scores_tx
            .send_replace(Leaderboard::from_scores(scores));
        self.inner.board_tx.send_replace(board.view());
        self.inner.state_tx.send_replace(SessionState::RoundResolved);
        Verdict::Won { points }
    }

    /// Casts a skip vote for the open clue.
    ///
    /// Only participants holding a nonzero score may vote, once per clue.
    /// When every such participant has voted the clue is abandoned: marked
    /// unavailable with nobody credited.
    ///
    /// # Errors
    ///
    /// [`SessionError::VoteRejected`] with the reason, or
    /// [`SessionError::Stale`] after the game has ended.
    #[instrument(skip(self), fields(session = %self.inner.id, participant = %participant))]
    pub async fn vote_skip(&self, participant: ParticipantId) -> Result<VoteTally, SessionError> {
        let mut arbiter = self.inner.gate.lock().await;
        if arbiter.state.is_over() {
            return Err(SessionError::Stale);
        }
        let Arbiter {
            board,
            scores,
            round,
            state,
            ..
        } = &mut *arbiter;

        let open = round
            .as_mut()
            .filter(|r| r.resolution.is_none() && *state == SessionState::ClueOpen)
            .ok_or(VoteRejected::NotEligible)?;
        if scores.get(&participant).copied().unwrap_or(0) == 0 {
            return Err(VoteRejected::NoScore.into());
        }
        if !open.votes.insert(participant) {
            return Err(VoteRejected::AlreadyVoted.into());
        }

        let required = scores.values().filter(|score| **score != 0).count();
        let votes = open.votes.len();
        let passed = votes >= required;
        debug!(votes, required, passed, "Skip vote recorded");

        if passed {
            board.claim(open.key);
            open.resolution = Some(Resolution::Skipped);
            open.token.cancel();
            *state = SessionState::RoundResolved;
            info!(round = open.id, "Clue skipped by vote");
            self.inner.board_tx.send_replace(board.view());
            self.inner.state_tx.send_replace(SessionState::RoundResolved);
        }

        Ok(VoteTally {
            votes,
            required,
            passed,
        })
    }

    /// Collects the outcome of a resolved clue and advances the game.
    ///
    /// Moves to `SelectingCategory`, or to `GameOver(BoardExhausted)` when no
    /// clue remains. Returns `None` if no resolved clue is waiting.
    #[instrument(skip(self), fields(session = %self.inner.id))]
    pub async fn close_round(&self) -> Option<RoundOutcome> {
        let mut arbiter = self.inner.gate.lock().await;
        if !arbiter
            .round
            .as_ref()
            .is_some_and(|r| r.resolution.is_some())
        {
            return None;
        }
        let round = arbiter.round.take()?;
        let resolution = round.resolution?;
        let clue = arbiter.board.clue(round.key)?;
        let outcome = RoundOutcome {
            clue: ClueReveal {
                category: clue.category().clone(),
                value: clue.value(),
                text: clue.text().clone(),
            },
            answer: clue.raw_answer().clone(),
            resolution,
        };
        self.inner.round_tx.send_replace(None);

        if !arbiter.state.is_over() {
            if arbiter.board.is_exhausted() {
                self.end(&mut arbiter, GameOverReason::BoardExhausted);
            } else {
                arbiter.state = SessionState::SelectingCategory;
                self.inner
                    .state_tx
                    .send_replace(SessionState::SelectingCategory);
            }
        }
        debug!(round = round.id, "Round closed");
        Some(outcome)
    }

    /// Ends the game from any state.
    ///
    /// Guesses still waiting for the gate are released without credit. An
    /// open clue is resolved as [`Resolution::Stopped`] and stays available.
    ///
    /// # Errors
    ///
    /// [`SessionError::Stale`] if the game has already ended.
    #[instrument(skip(self), fields(session = %self.inner.id))]
    pub async fn stop(&self) -> Result<(), SessionError> {
        self.finish(GameOverReason::Stopped).await
    }

    /// Ends the game because nobody chose a clue in time.
    pub(crate) async fn expire(&self) -> Result<(), SessionError> {
        self.finish(GameOverReason::NoResponse).await
    }

    async fn finish(&self, reason: GameOverReason) -> Result<(), SessionError> {
        // Cancel before queueing so pending workers leave the gate queue.
        let ticket = self.inner.round_tx.borrow().clone();
        if let Some(ticket) = ticket {
            ticket.token.cancel();
        }
        let mut arbiter = self.inner.gate.lock().await;
        if arbiter.state.is_over() {
            warn!(%reason, "Session already ended");
            return Err(SessionError::Stale);
        }
        if let Some(open) = arbiter.round.as_mut().filter(|r| r.resolution.is_none()) {
            open.resolution = Some(Resolution::Stopped);
            open.token.cancel();
        }
        self.end(&mut arbiter, reason);
        Ok(())
    }

    fn end(&self, arbiter: &mut Arbiter, reason: GameOverReason) {
        let state = SessionState::GameOver(reason);
        arbiter.state = state;
        self.inner.stop.cancel();
        self.inner.state_tx.send_replace(state);
        info!(%reason, remaining = arbiter.board.remaining(), "Game over");
    }
}

fn expect_state(actual: SessionState, expected: SessionState) -> Result<(), SessionError> {
    if actual.is_over() {
        Err(SessionError::Stale)
    } else if actual != expected {
        Err(SessionError::WrongState { expected, actual })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Clue;
    use chrono::Utc;

    fn session() -> JeopardySession {
        let mut board = ClueBoard::new();
        board
            .add_category(
                "SCIENCE",
                vec![
                    Clue::new("", "H2O", "water", 200),
                    Clue::new("", "Red planet", "Mars", 400),
                ],
            )
            .unwrap();
        JeopardySession::new("test", board)
    }

    fn guess(who: &str, text: &str) -> Guess {
        Guess::new(ParticipantId::from(who), text.to_string(), Utc::now())
    }

    #[tokio::test]
    async fn test_guess_without_open_clue_is_discarded() {
        let session = session();
        assert_eq!(
            session.submit_guess(guess("alice", "what is water")).await,
            Verdict::Discarded
        );
    }

    #[tokio::test]
    async fn test_select_while_clue_open_is_wrong_state() {
        let session = session();
        session.select_clue("science for 200").await.unwrap();
        let err = session.select_clue("science for 400").await.unwrap_err();
        assert_eq!(
            err,
            SessionError::WrongState {
                expected: SessionState::SelectingCategory,
                actual: SessionState::ClueOpen,
            }
        );
    }

    #[tokio::test]
    async fn test_incorrect_guess_keeps_clue_open() {
        let session = session();
        session.select_clue("science for 200").await.unwrap();
        assert_eq!(
            session.submit_guess(guess("alice", "what is wine")).await,
            Verdict::Incorrect
        );
        assert_eq!(session.state(), SessionState::ClueOpen);
        assert!(session.close_round().await.is_none());
    }

    #[tokio::test]
    async fn test_won_round_then_close() {
        let session = session();
        session.select_clue("science for 200").await.unwrap();
        let token = session.round_token().unwrap();
        assert_eq!(
            session.submit_guess(guess("alice", "what is water")).await,
            Verdict::Won { points: 200 }
        );
        assert!(token.is_cancelled());
        assert_eq!(session.state(), SessionState::RoundResolved);
        assert_eq!(
            session.submit_guess(guess("bob", "what is water")).await,
            Verdict::Discarded
        );

        let outcome = session.close_round().await.unwrap();
        assert_eq!(outcome.answer, "water");
        assert_eq!(outcome.delta().unwrap().points, 200);
        assert_eq!(session.state(), SessionState::SelectingCategory);
        assert!(session.round_token().is_none());
        assert!(!session.stop_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_last_clue_ends_game() {
        let session = session();
        for (choice, answer) in [("science for 200", "water"), ("science for 400", "mars")] {
            session.select_clue(choice).await.unwrap();
            let verdict = session
                .submit_guess(guess("alice", &format!("what is {answer}")))
                .await;
            assert!(matches!(verdict, Verdict::Won { .. }));
            session.close_round().await.unwrap();
        }
        assert_eq!(
            session.state(),
            SessionState::GameOver(GameOverReason::BoardExhausted)
        );
        assert!(session.stop_token().is_cancelled());
        assert_eq!(session.stop().await, Err(SessionError::Stale));
    }

    #[tokio::test]
    async fn test_vote_outside_open_clue_not_eligible() {
        let session = session();
        let err = session
            .vote_skip(ParticipantId::from("alice"))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::VoteRejected(VoteRejected::NotEligible));
    }

    #[tokio::test]
    async fn test_vote_without_score_rejected() {
        let session = session();
        session.select_clue("science for 200").await.unwrap();
        let err = session
            .vote_skip(ParticipantId::from("alice"))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::VoteRejected(VoteRejected::NoScore));
    }

    #[tokio::test]
    async fn test_stop_releases_guesses_queued_at_gate() {
        const QUEUED: usize = 8;
        let session = session();
        session.select_clue("science for 200").await.unwrap();

        let guard = session.inner.gate.lock().await;
        let mut workers = tokio::task::JoinSet::new();
        for i in 0..QUEUED {
            let session = session.clone();
            workers.spawn(async move {
                session
                    .submit_guess(guess(&format!("player{i}"), "what is water"))
                    .await
            });
        }
        for _ in 0..QUEUED {
            tokio::task::yield_now().await;
        }
        let stop = tokio::spawn({
            let session = session.clone();
            async move { session.stop().await }
        });
        tokio::task::yield_now().await;
        assert_eq!(session.state(), SessionState::ClueOpen);
        drop(guard);

        stop.await.unwrap().unwrap();
        let verdicts = workers.join_all().await;
        assert_eq!(verdicts.len(), QUEUED);
        assert!(verdicts.iter().all(|v| *v == Verdict::Discarded));
        assert!(session.leaderboard().is_empty());
        assert_eq!(
            session.state(),
            SessionState::GameOver(GameOverReason::Stopped)
        );
        assert!(session.board_view().categories[0].slots[0].available);
    }

    #[tokio::test]
    async fn test_stop_with_open_clue() {
        let session = session();
        session.select_clue("science for 200").await.unwrap();
        let token = session.round_token().unwrap();
        session.stop().await.unwrap();

        assert!(token.is_cancelled());
        assert_eq!(
            session.state(),
            SessionState::GameOver(GameOverReason::Stopped)
        );
        assert_eq!(
            session.submit_guess(guess("alice", "what is water")).await,
            Verdict::Discarded
        );
        let outcome = session.close_round().await.unwrap();
        assert_eq!(outcome.resolution, Resolution::Stopped);
        assert!(session.board_view().categories[0].slots[0].available);
        assert_eq!(session.stop().await, Err(SessionError::Stale));
        assert_eq!(
            session.select_clue("science for 400").await,
            Err(SessionError::Stale)
        );
    }
}
