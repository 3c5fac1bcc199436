//! Clue board: categories, clues, selection parsing, and clue banks.

mod bank;
#[allow(clippy::module_inception)]
mod board;
mod clue;
mod selection;

pub use bank::{BankEntry, BankError, ClueBank};
pub use board::{BoardError, BoardView, Category, CategoryView, ClueBoard, ClueKey, SlotView};
pub use clue::Clue;
pub use selection::{SelectionError, is_selection_attempt};
