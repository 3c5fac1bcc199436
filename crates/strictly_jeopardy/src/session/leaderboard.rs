//! Score snapshots.

use super::types::ParticipantId;
use serde::Serialize;
use std::collections::HashMap;

/// One participant's standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// The participant.
    pub participant: ParticipantId,
    /// Total points this session.
    pub score: i64,
}

/// Read-only snapshot of session scores, highest first.
///
/// Ties are ordered by participant id so snapshots are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    standings: Vec<Standing>,
}

impl Leaderboard {
    /// Builds a sorted snapshot from a score map.
    pub fn from_scores(scores: &HashMap<ParticipantId, i64>) -> Self {
        let mut standings: Vec<Standing> = scores
            .iter()
            .map(|(participant, score)| Standing {
                participant: participant.clone(),
                score: *score,
            })
            .collect();
        standings.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.participant.cmp(&b.participant))
        });
        Self { standings }
    }

    /// Standings, highest score first.
    pub fn standings(&self) -> &[Standing] {
        &self.standings
    }

    /// Score of one participant, if they have one.
    pub fn score_of(&self, participant: &ParticipantId) -> Option<i64> {
        self.standings
            .iter()
            .find(|s| &s.participant == participant)
            .map(|s| s.score)
    }

    /// Number of participants with a score.
    pub fn len(&self) -> usize {
        self.standings.len()
    }

    /// True if nobody has scored.
    pub fn is_empty(&self) -> bool {
        self.standings.is_empty()
    }

    /// The leader, if any.
    pub fn leader(&self) -> Option<&Standing> {
        self.standings.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_descending_with_stable_ties() {
        let scores = HashMap::from([
            (ParticipantId::from("carol"), 200),
            (ParticipantId::from("alice"), 600),
            (ParticipantId::from("bob"), 200),
        ]);
        let board = Leaderboard::from_scores(&scores);
        let order: Vec<&str> = board
            .standings()
            .iter()
            .map(|s| s.participant.as_str())
            .collect();
        assert_eq!(order, ["alice", "bob", "carol"]);
        assert_eq!(board.leader().map(|s| s.score), Some(600));
        assert_eq!(board.score_of(&ParticipantId::from("bob")), Some(200));
        assert_eq!(board.score_of(&ParticipantId::from("dave")), None);
    }
}
