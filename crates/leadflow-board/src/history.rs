#![forbid(unsafe_code)]

//! Undo/redo for drag results.
//!
//! Only reorderings are recorded: card moves and column reorders. Edits made
//! through forms (add, rename, delete) are not undoable here.
//!
//! # Invariants
//!
//! 1. `undo_len() <= config.max_depth` after any operation; the oldest entry
//!    is evicted first.
//! 2. Recording a new entry clears the redo stack.
//! 3. Undoing a card move that crossed columns restores the entry timestamp
//!    the card had before the move.
//!
//! # Failure Modes
//!
//! An entry can go stale when the board is edited underneath it (the card or
//! column was deleted, or something else moved it). Stale entries are
//! dropped with a `debug` event and the next entry is tried.

use std::collections::VecDeque;

use tracing::debug;

use crate::controller::DropOutcome;
use crate::model::ColumnId;
use crate::store::{BoardStore, CardMove};

/// Limits for [`MoveHistory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of undoable entries.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

/// One recorded reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEntry {
    CardMove(CardMove),
    ColumnReorder {
        column_id: ColumnId,
        from: usize,
        to: usize,
    },
}

impl HistoryEntry {
    /// The entry for a drop that changed the board.
    #[must_use]
    pub fn from_outcome(outcome: &DropOutcome) -> Option<Self> {
        match *outcome {
            DropOutcome::CardMoved(moved) => Some(Self::CardMove(moved)),
            DropOutcome::ColumnsReordered {
                column_id,
                from,
                to,
            } => Some(Self::ColumnReorder {
                column_id,
                from,
                to,
            }),
            DropOutcome::Cancelled | DropOutcome::NoOp => None,
        }
    }
}

/// Dual undo/redo stacks over [`HistoryEntry`].
#[derive(Debug, Clone, Default)]
pub struct MoveHistory {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    config: HistoryConfig,
}

impl MoveHistory {
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            config,
        }
    }

    /// Record an entry that has already been applied to the board.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.redo_stack.clear();
        self.undo_stack.push_back(entry);
        self.enforce_depth();
    }

    /// Revert the newest entry. Returns the entry that was reverted.
    pub fn undo(&mut self, board: &mut BoardStore) -> Option<HistoryEntry> {
        while let Some(entry) = self.undo_stack.pop_back() {
            if revert(board, entry) {
                self.redo_stack.push_back(entry);
                return Some(entry);
            }
            debug!(target: "leadflow.history", ?entry, "stale undo entry dropped");
        }
        None
    }

    /// Re-apply the newest undone entry. Returns the entry as re-applied.
    pub fn redo(&mut self, board: &mut BoardStore) -> Option<HistoryEntry> {
        while let Some(entry) = self.redo_stack.pop_back() {
            if let Some(applied) = reapply(board, entry) {
                self.undo_stack.push_back(applied);
                self.enforce_depth();
                return Some(applied);
            }
            debug!(target: "leadflow.history", ?entry, "stale redo entry dropped");
        }
        None
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    #[must_use]
    pub fn config(&self) -> HistoryConfig {
        self.config
    }

    fn enforce_depth(&mut self) {
        while self.undo_stack.len() > self.config.max_depth {
            self.undo_stack.pop_front();
        }
    }
}

fn revert(board: &mut BoardStore, entry: HistoryEntry) -> bool {
    match entry {
        HistoryEntry::CardMove(moved) => {
            if board.card_position(moved.card_id) != Some((moved.to_column, moved.to_index)) {
                return false;
            }
            if board
                .move_card(moved.card_id, moved.from_column, moved.from_index)
                .is_none()
            {
                return false;
            }
            if moved.crossed_columns() {
                board.restore_entered_at(moved.card_id, moved.previous_entered_at);
            }
            true
        }
        HistoryEntry::ColumnReorder {
            column_id,
            from,
            to,
        } => board.column_index(column_id) == Some(to) && board.reorder_columns(to, from),
    }
}

fn reapply(board: &mut BoardStore, entry: HistoryEntry) -> Option<HistoryEntry> {
    match entry {
        HistoryEntry::CardMove(moved) => {
            if board.card_position(moved.card_id) != Some((moved.from_column, moved.from_index)) {
                return None;
            }
            board
                .move_card(moved.card_id, moved.to_column, moved.to_index)
                .map(HistoryEntry::CardMove)
        }
        HistoryEntry::ColumnReorder {
            column_id,
            from,
            to,
        } => (board.column_index(column_id) == Some(from) && board.reorder_columns(from, to))
            .then_some(entry),
    }
}
