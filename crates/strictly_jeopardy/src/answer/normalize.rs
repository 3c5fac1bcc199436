//! Canonical text form shared by answers and guesses.
//!
//! Both sides of a comparison go through [`normalize`]: lowercase, fold to
//! ASCII, drop punctuation, drop articles. Guesses additionally lose their
//! question-form opener (`what is`, `who was`, ...) via [`normalize_guess`].

use tracing::instrument;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Interrogatives that may open a guess ("what is ...").
const INTERROGATIVES: [&str; 6] = ["what", "whats", "where", "wheres", "who", "whos"];

/// Copulas that may follow the interrogative ("... is ...").
const COPULAS: [&str; 4] = ["is", "are", "was", "were"];

/// Articles dropped from the canonical form.
const ARTICLES: [&str; 3] = ["the", "a", "an"];

/// Normalizes answer or guess text into its comparable form.
///
/// The result is lowercase ASCII-folded words separated by single spaces,
/// with punctuation removed, a leading article stripped, and embedded
/// articles (`the`, `an`, `a`) removed. If every word is an article the last
/// one is kept so that answers like "The The" stay non-empty.
///
/// Normalizing an already normalized string returns it unchanged.
#[instrument(level = "trace")]
pub fn normalize(raw: &str) -> String {
    // Compatibility decomposition can reintroduce capitals ("𝐀" -> "A").
    let cleaned = strip_punctuation(&fold(&raw.to_lowercase()).to_lowercase());
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    drop_articles(&words).join(" ")
}

/// Normalizes a guess, removing a leading interrogative and copula first.
///
/// `"What's the Eiffel Tower?"` becomes `"eiffel tower"`.
#[instrument(level = "trace")]
pub fn normalize_guess(raw: &str) -> String {
    normalize(strip_question_form(raw))
}

/// Strips at most one interrogative and then at most one copula from the
/// front of `raw`, returning the remainder as a slice of the input.
pub(crate) fn strip_question_form(raw: &str) -> &str {
    let rest = strip_leading_word(raw, &INTERROGATIVES);
    strip_leading_word(rest, &COPULAS)
}

/// Returns true if `raw` opens with an interrogative word.
pub fn is_question_form(raw: &str) -> bool {
    leading_word(raw).is_some_and(|(word, _)| INTERROGATIVES.contains(&word.as_str()))
}

/// Folds accented and extended characters to their closest ASCII form.
///
/// Characters with no ASCII equivalent pass through unchanged.
pub(crate) fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfkd() {
        if c.is_ascii() {
            out.push(c);
        } else if is_combining_mark(c) {
            continue;
        } else {
            match c {
                'ß' => out.push_str("ss"),
                'æ' | 'Æ' => out.push_str("ae"),
                'œ' | 'Œ' => out.push_str("oe"),
                'ø' | 'Ø' => out.push('o'),
                'ł' | 'Ł' => out.push('l'),
                'đ' | 'Đ' => out.push('d'),
                'þ' | 'Þ' => out.push_str("th"),
                '\u{201C}' | '\u{201D}' | '\u{201E}' => out.push('"'),
                '\u{2018}' | '\u{2019}' => out.push('\''),
                other => out.push(other),
            }
        }
    }
    out
}

fn strip_punctuation(text: &str) -> String {
    text.chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() {
                Some(' ')
            } else {
                None
            }
        })
        .collect()
}

fn drop_articles<'a>(words: &[&'a str]) -> Vec<&'a str> {
    let kept: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| !ARTICLES.contains(w))
        .collect();
    if kept.is_empty() {
        return words.last().copied().into_iter().collect();
    }
    kept
}

/// Splits off the first word of `raw`, compared with punctuation removed.
fn leading_word(raw: &str) -> Option<(String, &str)> {
    let trimmed = raw.trim_start();
    let end = trimmed
        .find(char::is_whitespace)
        .unwrap_or(trimmed.len());
    if end == 0 {
        return None;
    }
    let word = strip_punctuation(&fold(&trimmed[..end].to_lowercase()));
    Some((word, &trimmed[end..]))
}

fn strip_leading_word<'a>(raw: &'a str, words: &[&str]) -> &'a str {
    match leading_word(raw) {
        // A lone "what" with nothing after it is left alone.
        Some((word, rest)) if words.contains(&word.as_str()) && !rest.trim().is_empty() => rest,
        _ => raw,
    }
}
