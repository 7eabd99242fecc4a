//! Bounded per-table undo/redo history of geometry snapshots.
//!
//! Transitions are pure and synchronous. Persisting the state an undo or redo
//! lands on is the caller's job (see `controller`), so this store stays
//! testable without any network layer.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use crate::consts::MAX_HISTORY;
use crate::doc::TableState;

/// Undo history for one mounted table glyph.
///
/// `past` is ordered oldest-first and never exceeds [`MAX_HISTORY`] entries.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoHistory {
    past: VecDeque<TableState>,
    present: TableState,
    future: Vec<TableState>,
}

impl UndoHistory {
    /// Seed a history with the persisted geometry and nothing to undo.
    #[must_use]
    pub fn new(present: TableState) -> Self {
        Self { past: VecDeque::new(), present, future: Vec::new() }
    }

    /// The current committed snapshot.
    #[must_use]
    pub fn present(&self) -> TableState {
        self.present
    }

    /// Snapshots available to undo, oldest first.
    #[must_use]
    pub fn past(&self) -> &VecDeque<TableState> {
        &self.past
    }

    /// Snapshots available to redo, most recently undone last.
    #[must_use]
    pub fn future(&self) -> &[TableState] {
        &self.future
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Commit a new snapshot. Drops the oldest entry past the cap and
    /// discards any redo branch.
    pub fn push(&mut self, state: TableState) {
        self.past.push_back(self.present);
        while self.past.len() > MAX_HISTORY {
            self.past.pop_front();
        }
        self.present = state;
        self.future.clear();
    }

    /// Step back one snapshot. Returns the new present, or `None` when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> Option<TableState> {
        let previous = self.past.pop_back()?;
        self.future.push(self.present);
        self.present = previous;
        Some(previous)
    }

    /// Step forward one snapshot. Returns the new present, or `None` when
    /// there is nothing to redo.
    pub fn redo(&mut self) -> Option<TableState> {
        let next = self.future.pop()?;
        self.past.push_back(self.present);
        while self.past.len() > MAX_HISTORY {
            self.past.pop_front();
        }
        self.present = next;
        Some(next)
    }

    /// Hard reset to `state`, dropping both stacks.
    pub fn set(&mut self, state: TableState) {
        self.past.clear();
        self.future.clear();
        self.present = state;
    }

    /// Drop both stacks and keep the present as the new baseline.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
