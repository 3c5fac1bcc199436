//! Fuzzy comparison of a guess against an [`AnswerSpec`].

use super::normalize::{normalize, strip_question_form};
use super::spec::{AnswerSpec, SatisfactionRule};
use tracing::{debug, instrument};

/// Share of the target length tolerated as edits for long answers.
const LONG_ANSWER_TOLERANCE: f64 = 0.15;

/// Delimiters that split a guess into fragments, tried in this order.
const FRAGMENT_DELIMITERS: [&str; 3] = [",", " and ", " & "];

/// Returns true if `guess` is an acceptable response for `spec`.
///
/// Alternatives are checked first: each alternative can be satisfied by at
/// most one fragment of the guess and each fragment credits at most one
/// alternative. If too few are satisfied the whole guess is compared against
/// the primary form.
#[instrument(skip(spec), fields(primary = %spec.primary_form()))]
pub fn matches(spec: &AnswerSpec, guess: &str) -> bool {
    let stripped = strip_question_form(guess);
    let whole = normalize(stripped);
    if whole.is_empty() {
        return false;
    }

    if !spec.alternatives().is_empty() {
        let split = spec.is_enumerated() || matches!(spec.rule(), SatisfactionRule::AtLeastN(_));
        let fragments = if split {
            split_fragments(stripped)
        } else {
            vec![whole.clone()]
        };
        let satisfied = count_satisfied(spec.alternatives(), &fragments);
        debug!(?fragments, satisfied, required = spec.rule().threshold(), "Checked alternatives");
        if satisfied >= spec.rule().threshold() {
            return true;
        }
    }

    within_tolerance(spec.primary_form(), &whole)
}

/// Maximum edit distance accepted against a target of `len` characters.
pub fn tolerance(len: usize) -> usize {
    match len {
        0..=5 => 0,
        6..=9 => 1,
        _ => (len as f64 * LONG_ANSWER_TOLERANCE).round() as usize,
    }
}

/// True if `candidate` is within the length-scaled edit tolerance of `target`.
pub fn within_tolerance(target: &str, candidate: &str) -> bool {
    let distance = levenshtein(target, candidate);
    distance == 0 || distance <= tolerance(target.chars().count())
}

/// Levenshtein edit distance over Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Splits a guess on every delimiter in the conjunction family and
/// normalizes each non-empty piece.
fn split_fragments(guess: &str) -> Vec<String> {
    let lower = guess.to_lowercase();
    let mut pieces = vec![lower.as_str()];
    for delimiter in FRAGMENT_DELIMITERS {
        pieces = pieces
            .into_iter()
            .flat_map(|piece| piece.split(delimiter))
            .collect();
    }
    pieces
        .into_iter()
        .map(normalize)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

fn count_satisfied(alternatives: &[String], fragments: &[String]) -> usize {
    let mut consumed = vec![false; fragments.len()];
    let mut satisfied = 0;
    for alternative in alternatives {
        let hit = fragments
            .iter()
            .enumerate()
            .find(|(i, fragment)| !consumed[*i] && within_tolerance(alternative, fragment));
        if let Some((i, _)) = hit {
            consumed[i] = true;
            satisfied += 1;
        }
    }
    satisfied
}
