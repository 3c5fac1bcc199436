//! Guess arbitration, skip votes, and stop handling on a live session.

use chrono::Utc;
use strictly_jeopardy::{
    Clue, ClueBoard, GameOverReason, Guess, JeopardySession, ParticipantId, Resolution,
    SessionError, SessionState, Verdict, VoteRejected, VoteTally,
};
use tokio::task::JoinSet;

fn board() -> ClueBoard {
    let mut board = ClueBoard::new();
    board
        .add_category(
            "SCIENCE",
            vec![
                Clue::new("", "H2O", "water", 200),
                Clue::new("", "The red planet", "Mars", 400),
                Clue::new("", "Force that keeps us grounded", "gravity", 600),
            ],
        )
        .unwrap();
    board
        .add_category(
            "HISTORY",
            vec![Clue::new("", "First US president", "George Washington", 200)],
        )
        .unwrap();
    board
}

fn guess(who: &str, text: &str) -> Guess {
    Guess::new(ParticipantId::from(who), text.to_string(), Utc::now())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_correct_guesses_have_one_winner() {
    const PLAYERS: usize = 32;
    let session = JeopardySession::new("general", board());
    session.select_clue("science for 200").await.unwrap();

    let mut workers = JoinSet::new();
    for i in 0..PLAYERS {
        let session = session.clone();
        workers.spawn(async move {
            session
                .submit_guess(guess(&format!("player{i}"), "what is water"))
                .await
        });
    }
    let verdicts = workers.join_all().await;

    let won = verdicts
        .iter()
        .filter(|v| matches!(v, Verdict::Won { points: 200 }))
        .count();
    let discarded = verdicts
        .iter()
        .filter(|v| **v == Verdict::Discarded)
        .count();
    assert_eq!(won, 1);
    assert_eq!(discarded, PLAYERS - 1);

    let leaderboard = session.leaderboard();
    assert_eq!(leaderboard.len(), 1);
    assert_eq!(leaderboard.standings()[0].score, 200);
}

#[tokio::test]
async fn test_full_round() {
    let session = JeopardySession::new("general", board());
    let reveal = session.select_clue("science for 200").await.unwrap();
    assert_eq!(reveal.category, "SCIENCE");
    assert_eq!(reveal.value, 200);
    assert_eq!(session.state(), SessionState::ClueOpen);

    let right = tokio::spawn({
        let session = session.clone();
        async move { session.submit_guess(guess("alice", "what is water")).await }
    });
    let wrong = tokio::spawn({
        let session = session.clone();
        async move { session.submit_guess(guess("bob", "what is wine")).await }
    });
    assert_eq!(right.await.unwrap(), Verdict::Won { points: 200 });
    assert_ne!(wrong.await.unwrap(), Verdict::Won { points: 200 });

    let leaderboard = session.leaderboard();
    assert_eq!(leaderboard.len(), 1);
    assert_eq!(
        leaderboard.score_of(&ParticipantId::from("alice")),
        Some(200)
    );
    assert!(!session.board_view().categories[0].slots[0].available);

    let outcome = session.close_round().await.unwrap();
    assert!(matches!(
        outcome.resolution,
        Resolution::Answered { points: 200, .. }
    ));
    assert_eq!(session.state(), SessionState::SelectingCategory);

    let err = session.select_clue("science for 200").await.unwrap_err();
    assert_eq!(err.to_string(), "That clue is not available");
}

#[tokio::test]
async fn test_vote_skip() {
    let session = JeopardySession::new("general", board());
    let alice = ParticipantId::from("alice");
    let bob = ParticipantId::from("bob");

    for (choice, who, answer) in [
        ("science for 200", "alice", "what is water"),
        ("history for 200", "bob", "who is george washington"),
    ] {
        session.select_clue(choice).await.unwrap();
        assert!(matches!(
            session.submit_guess(guess(who, answer)).await,
            Verdict::Won { .. }
        ));
        session.close_round().await.unwrap();
    }

    session.select_clue("science for 400").await.unwrap();
    let round = session.round_token().unwrap();

    assert_eq!(
        session.vote_skip(alice.clone()).await.unwrap(),
        VoteTally {
            votes: 1,
            required: 2,
            passed: false
        }
    );
    assert_eq!(
        session.vote_skip(alice.clone()).await,
        Err(SessionError::VoteRejected(VoteRejected::AlreadyVoted))
    );
    assert_eq!(
        session.vote_skip(ParticipantId::from("carol")).await,
        Err(SessionError::VoteRejected(VoteRejected::NoScore))
    );
    assert!(!round.is_cancelled());

    let tally = session.vote_skip(bob.clone()).await.unwrap();
    assert!(tally.passed);
    assert!(round.is_cancelled());
    assert_eq!(session.state(), SessionState::RoundResolved);
    assert_eq!(
        session.submit_guess(guess("alice", "what is mars")).await,
        Verdict::Discarded
    );

    let outcome = session.close_round().await.unwrap();
    assert_eq!(outcome.resolution, Resolution::Skipped);
    assert_eq!(outcome.answer, "Mars");
    assert!(outcome.delta().is_none());
    assert!(!session.board_view().categories[0].slots[1].available);
    assert_eq!(session.leaderboard().score_of(&alice), Some(200));
    assert_eq!(session.leaderboard().score_of(&bob), Some(200));

    assert_eq!(
        session.vote_skip(alice).await,
        Err(SessionError::VoteRejected(VoteRejected::NotEligible))
    );
}

#[tokio::test]
async fn test_stop_ends_game_and_rejects_later_calls() {
    let session = JeopardySession::new("general", board());
    session.select_clue("science for 600").await.unwrap();

    session.stop().await.unwrap();
    assert_eq!(
        session.state(),
        SessionState::GameOver(GameOverReason::Stopped)
    );
    assert_eq!(
        session.submit_guess(guess("alice", "what is gravity")).await,
        Verdict::Discarded
    );
    assert!(session.leaderboard().is_empty());

    assert_eq!(session.stop().await, Err(SessionError::Stale));
    assert_eq!(
        session.vote_skip(ParticipantId::from("alice")).await,
        Err(SessionError::Stale)
    );
}

#[tokio::test]
async fn test_leaderboard_readable_while_gate_busy() {
    let session = JeopardySession::new("general", board());
    session.select_clue("science for 200").await.unwrap();

    let mut state = session.watch_state();
    let winner = tokio::spawn({
        let session = session.clone();
        async move { session.submit_guess(guess("alice", "what is water")).await }
    });
    state
        .wait_for(|s| *s == SessionState::RoundResolved)
        .await
        .unwrap();
    assert_eq!(session.leaderboard().len(), 1);
    assert_eq!(winner.await.unwrap(), Verdict::Won { points: 200 });
}
