//! Line-oriented console transport.

use async_trait::async_trait;
use strictly_jeopardy::{
    Announcement, Announcer, CollaboratorError, Leaderboard, ParticipantId, Resolution,
};

/// Participant used for lines without a `name:` prefix.
const DEFAULT_PARTICIPANT: &str = "player";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    /// `!stop`: end the game.
    Stop,
    /// `!skip`: vote to skip the open clue.
    Skip(ParticipantId),
    /// `!scores`: print the leaderboard.
    Scores,
    /// Anything else is chat, forwarded to the game.
    Say(ParticipantId, String),
}

impl ConsoleInput {
    /// Parses `name: text`. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let (name, text) = match line.split_once(':') {
            Some((name, text)) if !name.trim().is_empty() && !name.contains(' ') => {
                (name.trim(), text.trim())
            }
            _ => (DEFAULT_PARTICIPANT, line.trim()),
        };
        if text.is_empty() {
            return None;
        }
        let participant = ParticipantId::from(name);
        Some(match text.to_lowercase().as_str() {
            "!stop" => Self::Stop,
            "!skip" => Self::Skip(participant),
            "!scores" => Self::Scores,
            _ => Self::Say(participant, text.to_string()),
        })
    }
}

/// Prints announcements to stdout, as text or JSON lines.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleAnnouncer {
    json: bool,
}

impl ConsoleAnnouncer {
    /// Creates an announcer.
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

#[async_trait]
impl Announcer for ConsoleAnnouncer {
    async fn announce(&self, announcement: Announcement) -> Result<(), CollaboratorError> {
        let line = if self.json {
            serde_json::to_string(&announcement)
                .map_err(|e| CollaboratorError::new(format!("Failed to encode announcement: {}", e)))?
        } else {
            render(&announcement)
        };
        println!("{line}");
        Ok(())
    }
}

/// Human-readable rendering of an announcement.
pub fn render(announcement: &Announcement) -> String {
    match announcement {
        Announcement::Welcome { example } => format!(
            "Welcome to Jeopardy! Pick a clue by typing e.g. \"{example}\". Answer with \"what is ...\"."
        ),
        Announcement::Board(board) => board
            .categories
            .iter()
            .map(|category| {
                let values: Vec<String> = category
                    .slots
                    .iter()
                    .map(|slot| {
                        if slot.available {
                            slot.value.to_string()
                        } else {
                            "-".repeat(slot.value.to_string().len())
                        }
                    })
                    .collect();
                format!("{:<24} {}", category.name, values.join("  "))
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Announcement::SelectionRejected { error } => format!("{error}. Try again."),
        Announcement::ClueRevealed(clue) => {
            format!("{} for {}\n{}", clue.category, clue.value, clue.text)
        }
        Announcement::RoundResolved(outcome) => match &outcome.resolution {
            Resolution::Answered { guess, points } => format!(
                "{} is correct! The answer was {}. +{}",
                guess.participant, outcome.answer, points
            ),
            Resolution::Skipped => format!("Skipped. The answer was {}.", outcome.answer),
            Resolution::Stopped => format!("Stopped. The answer was {}.", outcome.answer),
        },
        Announcement::GameOver {
            reason,
            leaderboard,
        } => format!("Game over ({reason}).\n{}", render_scores(leaderboard)),
    }
}

/// Leaderboard as one line per participant.
pub fn render_scores(leaderboard: &Leaderboard) -> String {
    if leaderboard.is_empty() {
        return "No scores yet.".to_string();
    }
    leaderboard
        .standings()
        .iter()
        .enumerate()
        .map(|(rank, standing)| format!("{}. {} {}", rank + 1, standing.participant, standing.score))
        .collect::<Vec<_>>()
        .join("\n")
}
