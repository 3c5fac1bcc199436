//! The category by clue grid.

use super::clue::Clue;
use crate::answer::normalize;
use derive_getters::Getters;
use serde::Serialize;
use tracing::{debug, instrument};

/// A named column of clues in display order.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Category {
    /// Category name as displayed.
    name: String,
    /// Clues in display order.
    clues: Vec<Clue>,
}

/// Position of a clue on a [`ClueBoard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClueKey {
    pub(crate) category: usize,
    pub(crate) slot: usize,
}

/// Category to clue mapping, in insertion order.
///
/// Category names are unique (compared in normalized form) and at most one
/// clue per (category, value) pair is available at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClueBoard {
    categories: Vec<Category>,
}

impl ClueBoard {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a category. Each clue is re-homed under `name`.
    ///
    /// # Errors
    ///
    /// Fails if the name is already on the board, or if two available clues
    /// share a value.
    #[instrument(skip(self, name, clues), fields(category = %name.as_ref()))]
    pub fn add_category(
        &mut self,
        name: impl AsRef<str>,
        clues: impl IntoIterator<Item = Clue>,
    ) -> Result<(), BoardError> {
        let name = name.as_ref();
        let key = normalize(name);
        if self.categories.iter().any(|c| normalize(&c.name) == key) {
            return Err(BoardError::DuplicateCategory(name.to_string()));
        }

        let mut column: Vec<Clue> = Vec::new();
        for mut clue in clues {
            clue.set_category(name);
            let clash = clue.is_available()
                && column
                    .iter()
                    .any(|c| c.is_available() && c.value() == clue.value());
            if clash {
                return Err(BoardError::DuplicateValue {
                    category: name.to_string(),
                    value: clue.value(),
                });
            }
            column.push(clue);
        }

        debug!(clues = column.len(), "Added category");
        self.categories.push(Category {
            name: name.to_string(),
            clues: column,
        });
        Ok(())
    }

    /// Categories in display order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Looks up a clue by key.
    pub fn clue(&self, key: ClueKey) -> Option<&Clue> {
        self.categories.get(key.category)?.clues.get(key.slot)
    }

    /// Marks a clue unavailable. Returns false if it already was.
    pub(crate) fn claim(&mut self, key: ClueKey) -> bool {
        self.categories
            .get_mut(key.category)
            .and_then(|c| c.clues.get_mut(key.slot))
            .is_some_and(Clue::claim)
    }

    /// Number of clues still available.
    pub fn remaining(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| c.clues.iter())
            .filter(|c| c.is_available())
            .count()
    }

    /// True when no clue is available.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Snapshot for display.
    pub fn view(&self) -> BoardView {
        BoardView {
            categories: self
                .categories
                .iter()
                .map(|c| CategoryView {
                    name: c.name.clone(),
                    slots: c
                        .clues
                        .iter()
                        .map(|clue| SlotView {
                            value: clue.value(),
                            available: clue.is_available(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Display snapshot of a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    /// Columns in display order.
    pub categories: Vec<CategoryView>,
}

/// Display snapshot of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryView {
    /// Category name.
    pub name: String,
    /// Values and availability in display order.
    pub slots: Vec<SlotView>,
}

/// Display snapshot of one clue slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotView {
    /// Point value.
    pub value: u32,
    /// Whether it can still be chosen.
    pub available: bool,
}

/// Error building a board.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum BoardError {
    /// A category with the same normalized name already exists.
    #[display("Category {:?} is already on the board", _0)]
    DuplicateCategory(String),

    /// Two available clues in one category share a value.
    #[display("Category {:?} has more than one clue worth {}", category, value)]
    DuplicateValue {
        /// Category name.
        category: String,
        /// The repeated value.
        value: u32,
    },
}

impl std::error::Error for BoardError {}
