//! A single trivia clue.

use crate::answer::{AnswerSpec, matches};
use derive_getters::Getters;
use tracing::instrument;

/// A trivia prompt with its canonical answer, point value, and availability.
///
/// The [`AnswerSpec`] is derived once at construction and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Clue {
    /// Category the clue belongs to.
    category: String,
    /// The prompt shown to participants.
    text: String,
    /// Canonical answer as written in the clue source.
    raw_answer: String,
    #[getter(skip)]
    value: u32,
    #[getter(skip)]
    available: bool,
    #[getter(skip)]
    answer: AnswerSpec,
}

impl Clue {
    /// Creates an available clue, deriving its accepted answers.
    #[instrument(skip(category, text, raw_answer))]
    pub fn new(
        category: impl Into<String>,
        text: impl Into<String>,
        raw_answer: impl Into<String>,
        value: u32,
    ) -> Self {
        let raw_answer = raw_answer.into();
        let answer = AnswerSpec::derive(&raw_answer);
        Self {
            category: category.into(),
            text: text.into(),
            raw_answer,
            value,
            available: true,
            answer,
        }
    }

    /// Point value credited for a correct response.
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Whether the clue can still be selected.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// The derived matching target.
    pub fn answer(&self) -> &AnswerSpec {
        &self.answer
    }

    /// Checks a participant's response against this clue.
    pub fn check(&self, guess: &str) -> bool {
        matches(&self.answer, guess)
    }

    pub(crate) fn set_category(&mut self, category: &str) {
        self.category = category.to_string();
    }

    /// Removes the clue from play. Returns false if it was already claimed.
    pub(crate) fn claim(&mut self) -> bool {
        std::mem::replace(&mut self.available, false)
    }
}
