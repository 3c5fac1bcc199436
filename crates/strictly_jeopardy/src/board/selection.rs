//! Parsing "category for value" choices out of free text.

use super::board::{ClueBoard, ClueKey};
use crate::answer::normalize;
use serde::Serialize;
use tracing::{debug, instrument};

/// Shortest digit run that makes a message look like a selection.
const MIN_VALUE_DIGITS: usize = 3;

/// Why a selection message did not pick an available clue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum SelectionError {
    /// No known category name appears in the message.
    #[display("No such category found")]
    WrongCategory,

    /// The category was recognized but no available clue has that value.
    /// `claimed` is set when a clue with that value exists but was already
    /// played.
    #[display("{}", if *claimed { "That clue is not available" } else { "There are no clues available for that amount" })]
    WrongAmount {
        /// A clue with the value exists but is no longer available.
        claimed: bool,
    },
}

impl std::error::Error for SelectionError {}

impl ClueBoard {
    /// Resolves a free-text choice such as `"science for 200"` to a clue.
    ///
    /// The category is the longest known category name contained in the
    /// normalized message; the value is the first run of digits.
    ///
    /// # Errors
    ///
    /// [`SelectionError::WrongCategory`] if no category name appears, and
    /// [`SelectionError::WrongAmount`] if the category has no available clue
    /// at that value.
    #[instrument(skip(self))]
    pub fn select(&self, message: &str) -> Result<ClueKey, SelectionError> {
        let text = normalize(message);

        let (category, _) = self
            .categories()
            .iter()
            .enumerate()
            .filter_map(|(i, c)| {
                let name = normalize(c.name());
                (!name.is_empty() && text.contains(&name)).then(|| (i, name.len()))
            })
            .max_by_key(|(i, len)| (*len, std::cmp::Reverse(*i)))
            .ok_or(SelectionError::WrongCategory)?;

        let value = first_number(&text).ok_or(SelectionError::WrongAmount { claimed: false })?;
        let clues = self.categories()[category].clues();

        let mut claimed = false;
        for (slot, clue) in clues.iter().enumerate() {
            if clue.value() != value {
                continue;
            }
            if clue.is_available() {
                debug!(category, slot, value, "Selection resolved");
                return Ok(ClueKey { category, slot });
            }
            claimed = true;
        }
        Err(SelectionError::WrongAmount { claimed })
    }
}

/// True if a message looks like an attempt to choose a clue: it contains
/// the word "for" or a run of at least three digits.
pub fn is_selection_attempt(message: &str) -> bool {
    let text = normalize(message);
    text.split(' ').any(|word| word == "for")
        || digit_runs(&text).any(|run| run.len() >= MIN_VALUE_DIGITS)
}

fn first_number(text: &str) -> Option<u32> {
    digit_runs(text).next()?.parse().ok()
}

fn digit_runs(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Clue;

    fn board() -> ClueBoard {
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
        board
            .add_category(
                "Computer Science",
                vec![Clue::new("", "Creator of Linux", "Linus Torvalds", 200)],
            )
            .unwrap();
        board
    }

    #[test]
    fn test_select_category_for_value() {
        let board = board();
        let key = board.select("Science for 200").unwrap();
        assert_eq!(board.clue(key).unwrap().raw_answer(), "water");
    }

    #[test]
    fn test_longest_category_wins() {
        let board = board();
        let key = board.select("computer science for $200!").unwrap();
        assert_eq!(board.clue(key).unwrap().category(), "Computer Science");
    }

    #[test]
    fn test_wrong_category() {
        assert_eq!(
            board().select("history for 200"),
            Err(SelectionError::WrongCategory)
        );
    }

    #[test]
    fn test_wrong_amount() {
        assert_eq!(
            board().select("science for 300"),
            Err(SelectionError::WrongAmount { claimed: false })
        );
        assert_eq!(
            board().select("science please"),
            Err(SelectionError::WrongAmount { claimed: false })
        );
    }

    #[test]
    fn test_claimed_clue() {
        let mut board = board();
        let key = board.select("science for 200").unwrap();
        board.claim(key);
        assert_eq!(
            board.select("science for 200"),
            Err(SelectionError::WrongAmount { claimed: true })
        );
    }

    #[test]
    fn test_first_digit_run() {
        assert_eq!(first_number("science for 400 not 200"), Some(400));
        assert_eq!(first_number("no digits"), None);
    }

    #[test]
    fn test_selection_attempt_filter() {
        assert!(is_selection_attempt("Science for 200"));
        assert!(is_selection_attempt("science 400"));
        assert!(!is_selection_attempt("lol 42"));
        assert!(!is_selection_attempt("what is water"));
        assert!(!is_selection_attempt("before lunch"));
    }
}
