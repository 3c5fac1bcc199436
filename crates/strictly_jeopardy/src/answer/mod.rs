//! Answer normalization, derivation, and fuzzy matching.

mod matcher;
mod normalize;
mod spec;

pub use matcher::{levenshtein, matches, tolerance, within_tolerance};
pub use normalize::{is_question_form, normalize, normalize_guess};
pub use spec::{AnswerSpec, SatisfactionRule};
