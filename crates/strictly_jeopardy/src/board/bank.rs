//! Clue pools loaded from TOML and random board generation.

use super::board::ClueBoard;
use super::clue::Clue;
use crate::answer::normalize;
use derive_getters::Getters;
use derive_more::{Display, Error};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument};

/// One clue as stored in a bank file.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct BankEntry {
    /// Category name.
    category: String,
    /// The prompt.
    question: String,
    /// Canonical answer text.
    answer: String,
    /// Point value.
    value: u32,
}

/// A pool of clues from which boards are drawn.
///
/// ```toml
/// [[clues]]
/// category = "SCIENCE"
/// question = "It covers about 71% of the Earth's surface"
/// answer = "water"
/// value = 200
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueBank {
    #[serde(default)]
    clues: Vec<BankEntry>,
}

impl ClueBank {
    /// Loads a bank from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BankError> {
        debug!("Loading clue bank from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| BankError::new(format!("Failed to read clue bank: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parses a bank from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, BankError> {
        let bank: Self = toml::from_str(content)
            .map_err(|e| BankError::new(format!("Failed to parse clue bank: {}", e)))?;
        info!(clues = bank.clues.len(), "Clue bank loaded");
        Ok(bank)
    }

    /// All entries in file order.
    pub fn entries(&self) -> &[BankEntry] {
        &self.clues
    }

    /// Number of clues in the bank.
    pub fn len(&self) -> usize {
        self.clues.len()
    }

    /// True if the bank holds no clues.
    pub fn is_empty(&self) -> bool {
        self.clues.is_empty()
    }

    /// Distinct category names in first-seen order.
    ///
    /// Names equal after normalization are one category, listed under the
    /// first spelling seen.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<String> = Vec::new();
        let mut names: Vec<&str> = Vec::new();
        for entry in &self.clues {
            let key = normalize(&entry.category);
            if !seen.contains(&key) {
                seen.push(key);
                names.push(&entry.category);
            }
        }
        names
    }

    /// Draws a board of `count` random categories.
    ///
    /// Each chosen category gets one randomly picked clue per distinct value,
    /// ordered by ascending value.
    ///
    /// # Errors
    ///
    /// Fails if `count` is zero or the bank has fewer categories.
    #[instrument(skip(self, rng))]
    pub fn generate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Result<ClueBoard, BankError> {
        let mut names = self.categories();
        if count == 0 || names.len() < count {
            return Err(BankError::new(format!(
                "Cannot draw {} categories from a bank of {}",
                count,
                names.len()
            )));
        }
        names.shuffle(rng);

        let mut board = ClueBoard::new();
        for name in names.into_iter().take(count) {
            let key = normalize(name);
            let mut by_value: BTreeMap<u32, Vec<&BankEntry>> = BTreeMap::new();
            for entry in self.clues.iter().filter(|e| normalize(&e.category) == key) {
                by_value.entry(entry.value).or_default().push(entry);
            }
            let clues: Vec<Clue> = by_value
                .values()
                .filter_map(|candidates| candidates.choose(rng))
                .map(|e| Clue::new(name, e.question.as_str(), e.answer.as_str(), e.value))
                .collect();
            board
                .add_category(name, clues)
                .map_err(|e| BankError::new(e.to_string()))?;
        }

        info!(categories = count, clues = board.remaining(), "Generated board");
        Ok(board)
    }
}

/// Clue bank error.
#[derive(Debug, Clone, Display, Error)]
#[display("Clue bank error: {} at {}:{}", message, file, line)]
pub struct BankError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl BankError {
    /// Creates a new bank error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const BANK: &str = r#"
[[clues]]
category = "SCIENCE"
question = "H2O"
answer = "water"
value = 200

[[clues]]
category = "SCIENCE"
question = "Frozen H2O"
answer = "ice"
value = 200

[[clues]]
category = "SCIENCE"
question = "Red planet"
answer = "Mars"
value = 400

[[clues]]
category = "HISTORY"
question = "First US president"
answer = "George Washington"
value = 200

[[clues]]
category = "ART"
question = "Painter of the Mona Lisa"
answer = "Leonardo da Vinci"
value = 600
"#;

    #[test]
    fn test_parse_bank() {
        let bank = ClueBank::from_toml_str(BANK).unwrap();
        assert_eq!(bank.len(), 5);
        assert_eq!(bank.categories(), ["SCIENCE", "HISTORY", "ART"]);
    }

    #[test]
    fn test_generate_one_clue_per_value() {
        let bank = ClueBank::from_toml_str(BANK).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let board = bank.generate(3, &mut rng).unwrap();
        assert_eq!(board.categories().len(), 3);
        let science = board
            .categories()
            .iter()
            .find(|c| c.name() == "SCIENCE")
            .unwrap();
        let values: Vec<u32> = science.clues().iter().map(|c| c.value()).collect();
        assert_eq!(values, [200, 400]);
        assert_eq!(board.remaining(), 4);
    }

    #[test]
    fn test_generate_too_many_categories() {
        let bank = ClueBank::from_toml_str(BANK).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(bank.generate(4, &mut rng).is_err());
        assert!(bank.generate(0, &mut rng).is_err());
    }

    #[test]
    fn test_category_spellings_merge() {
        let bank = ClueBank::from_toml_str(
            r#"
[[clues]]
category = "Science"
question = "H2O"
answer = "water"
value = 200

[[clues]]
category = "SCIENCE"
question = "Red planet"
answer = "Mars"
value = 400

[[clues]]
category = "HISTORY"
question = "First US president"
answer = "George Washington"
value = 200
"#,
        )
        .unwrap();
        assert_eq!(bank.categories(), ["Science", "HISTORY"]);

        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let board = bank.generate(2, &mut rng).unwrap();
            let science = board
                .categories()
                .iter()
                .find(|c| c.name() == "Science")
                .unwrap();
            let values: Vec<u32> = science.clues().iter().map(|c| c.value()).collect();
            assert_eq!(values, [200, 400]);
        }
    }

    #[test]
    fn test_invalid_toml() {
        let err = ClueBank::from_toml_str("this is not toml !!!").unwrap_err();
        assert!(err.message.contains("Failed to parse"));
    }
}
