//! Derivation of the accepted answer set from a clue's canonical answer.
//!
//! Canonical answers arrive as free text written for humans: "cruisers (or
//! ships)", "salt & pepper", "(2 of) cat, dog, bird". [`AnswerSpec::derive`]
//! turns one of these into a primary form plus accepted alternatives and a
//! satisfaction rule. The extraction is a permissive heuristic; the primary
//! form is always kept as the match target of last resort.

use super::normalize::{fold, normalize};
use tracing::{debug, instrument};

/// Minimum normalized length for an alternative to be accepted.
const MIN_ALTERNATIVE_LEN: usize = 2;

/// A parenthetical longer than this multiple of the base answer is treated
/// as an alternative rather than an elaboration.
const PARENTHETICAL_RATIO: f64 = 1.5;

/// How many alternatives a guess has to satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SatisfactionRule {
    /// Any single alternative is enough.
    AnyOne,
    /// At least this many distinct alternatives, each matched by a distinct
    /// fragment of the guess.
    AtLeastN(usize),
}

impl SatisfactionRule {
    /// Number of satisfied alternatives required.
    pub fn threshold(self) -> usize {
        match self {
            SatisfactionRule::AnyOne => 1,
            SatisfactionRule::AtLeastN(n) => n,
        }
    }
}

/// Matching target derived once from a clue's canonical answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSpec {
    primary_form: String,
    alternatives: Vec<String>,
    rule: SatisfactionRule,
    enumerated: bool,
}

impl AnswerSpec {
    /// Derives the accepted answers from raw canonical answer text.
    #[instrument]
    pub fn derive(raw: &str) -> Self {
        let folded = fold(&raw.to_lowercase());
        let text = folded.trim();

        let mut builder = Builder::default();

        let body = match enumeration_marker(text) {
            Some((count, rest)) => {
                for piece in rest.split(',') {
                    builder.accept(piece);
                }
                builder.rule = Some(match count {
                    1 => SatisfactionRule::AnyOne,
                    n => SatisfactionRule::AtLeastN(n),
                });
                builder.enumerated = true;
                rest
            }
            None => text,
        };

        if body.contains('/') {
            for piece in body.split('/') {
                builder.accept(piece);
            }
        }

        if body.contains(" and ") {
            builder.conjunction(body.split(" and "));
        } else if body.contains(" & ") {
            builder.conjunction(body.split(" & "));
        }

        let primary_source = match first_parenthetical(body) {
            Some(inner) => {
                let base = remove_parentheticals(body);
                builder.parenthetical(inner.trim(), &base);
                builder.accept(&base);
                base
            }
            None => body.to_string(),
        };

        let spec = Self {
            primary_form: normalize(&primary_source),
            alternatives: builder.alternatives,
            rule: builder.rule.unwrap_or(SatisfactionRule::AnyOne),
            enumerated: builder.enumerated,
        };
        debug!(
            primary = %spec.primary_form,
            alternatives = ?spec.alternatives,
            rule = ?spec.rule,
            "Derived answer spec"
        );
        spec
    }

    /// The normalized answer with any parenthetical removed.
    pub fn primary_form(&self) -> &str {
        &self.primary_form
    }

    /// Accepted alternative forms, normalized, in discovery order.
    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    /// How many alternatives a guess must satisfy.
    pub fn rule(&self) -> SatisfactionRule {
        self.rule
    }

    /// True when the answer was an explicit "(N of)" enumeration, in which
    /// case guesses are always split into fragments.
    pub fn is_enumerated(&self) -> bool {
        self.enumerated
    }
}

#[derive(Debug, Default)]
struct Builder {
    alternatives: Vec<String>,
    rule: Option<SatisfactionRule>,
    enumerated: bool,
}

impl Builder {
    /// Normalizes `piece` and keeps it if it is long enough and new.
    fn accept(&mut self, piece: &str) {
        let form = normalize(piece);
        if form.chars().count() >= MIN_ALTERNATIVE_LEN && !self.alternatives.contains(&form) {
            self.alternatives.push(form);
        }
    }

    /// Every conjunct counts toward the rule, including pieces too short to
    /// keep as alternatives.
    fn conjunction<'a>(&mut self, pieces: impl Iterator<Item = &'a str>) {
        let mut count = 0;
        for piece in pieces {
            self.accept(piece);
            count += 1;
        }
        if self.rule.is_none() {
            self.rule = Some(SatisfactionRule::AtLeastN(count));
        }
    }

    fn parenthetical(&mut self, inner: &str, base: &str) {
        if inner.starts_with("or") {
            // "cruisers (or ships)"; the split is on the bare substring
            for option in inner.split("or") {
                self.accept(option);
            }
        } else if inner.ends_with("accepted") {
            // "endurance (durability accepted)"
            let accepted = inner
                .strip_suffix(" also accepted")
                .or_else(|| inner.strip_suffix(" accepted"))
                .unwrap_or("");
            self.accept(accepted);
        } else if let Some(quoted) = first_quoted(inner) {
            // The Daily Planet ("Superman")
            self.accept(quoted);
        } else {
            // "MoMA (the Museum of Modern Art)"
            let inner_len = normalize(inner).chars().count() as f64;
            let base_len = normalize(base).chars().count() as f64;
            if inner_len > base_len * PARENTHETICAL_RATIO {
                self.accept(inner);
            }
        }
    }
}

/// Parses a leading "(N of)" marker for N in 1..=3.
fn enumeration_marker(text: &str) -> Option<(usize, &str)> {
    let rest = text.strip_prefix('(')?;
    let mut chars = rest.chars();
    let count = chars.next()?.to_digit(10)? as usize;
    if !(1..=3).contains(&count) {
        return None;
    }
    let rest = chars.as_str().strip_prefix(" of)")?;
    Some((count, rest.trim_start()))
}

/// Content of the first `(...)` group, if it is closed.
fn first_parenthetical(text: &str) -> Option<&str> {
    let open = text.find('(')?;
    let close = text[open + 1..].find(')')? + open + 1;
    Some(&text[open + 1..close])
}

/// Removes every closed `(...)` group, shortest match first.
fn remove_parentheticals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('(') {
        match rest[open + 1..].find(')') {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + 1 + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

fn first_quoted(text: &str) -> Option<&str> {
    let open = text.find('"')?;
    let after = &text[open + 1..];
    let close = after.find('"').unwrap_or(after.len());
    Some(&after[..close])
}
