#![forbid(unsafe_code)]

//! A board session: the store, the drag controller, move history and an
//! observer, wired together.
//!
//! Every mutation goes through the session so that the observer sees it.
//! The observer is where re-rendering and persistence hook in; it runs after
//! the mutation has been applied and cannot veto it.
//!
//! ```rust,ignore
//! let storage = FileStorage::new(data_dir);
//! let store = load_board(&storage, &config, Box::new(SystemClock));
//! let mut session = BoardSession::new(store, &config)
//!     .with_observer(PersistingObserver::new(storage, config.storage_key.clone()));
//! session.handle_drag(&event);
//! ```

use std::fmt;

use leadflow_core::DragEvent;
use tracing::debug;

use crate::config::BoardConfig;
use crate::controller::{DragController, DropOutcome};
use crate::history::{HistoryEntry, MoveHistory};
use crate::model::{CardId, ColumnId, LeadDraft};
use crate::store::{BoardStore, CardMove};

/// What changed on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardChange {
    CardMoved(CardMove),
    ColumnsReordered {
        column_id: ColumnId,
        from: usize,
        to: usize,
    },
    ColumnAdded(ColumnId),
    ColumnRenamed(ColumnId),
    ColumnRemoved {
        column_id: ColumnId,
        removed_cards: Vec<CardId>,
    },
    CardAdded(CardId),
    CardUpdated(CardId),
    CardRemoved(CardId),
    CommentAdded(CardId),
    Undone(HistoryEntry),
    Redone(HistoryEntry),
}

/// Receives every applied change.
pub trait BoardObserver {
    fn board_changed(&mut self, board: &BoardStore, change: &BoardChange);
}

impl<F> BoardObserver for F
where
    F: FnMut(&BoardStore, &BoardChange),
{
    fn board_changed(&mut self, board: &BoardStore, change: &BoardChange) {
        self(board, change);
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BoardObserver for NoopObserver {
    fn board_changed(&mut self, _board: &BoardStore, _change: &BoardChange) {}
}

/// Store, controller, history and observer of one open board.
pub struct BoardSession {
    store: BoardStore,
    controller: DragController,
    history: MoveHistory,
    observer: Box<dyn BoardObserver>,
}

impl fmt::Debug for BoardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardSession")
            .field("store", &self.store)
            .field("controller", &self.controller)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl BoardSession {
    /// Open a session over `store` with the configured collision strategy
    /// and history depth.
    #[must_use]
    pub fn new(store: BoardStore, config: &BoardConfig) -> Self {
        Self {
            store,
            controller: DragController::new(config.collision),
            history: MoveHistory::new(config.history()),
            observer: Box::new(NoopObserver),
        }
    }

    /// Replace the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: impl BoardObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    #[must_use]
    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    #[must_use]
    pub fn controller(&self) -> &DragController {
        &self.controller
    }

    #[must_use]
    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// Close the session, keeping the board.
    #[must_use]
    pub fn into_store(self) -> BoardStore {
        self.store
    }

    // -----------------------------------------------------------------------
    // Drag gestures
    // -----------------------------------------------------------------------

    /// Forward a drag event. Returns the outcome when the gesture finished.
    pub fn handle_drag(&mut self, event: &DragEvent) -> Option<DropOutcome> {
        let outcome = self.controller.handle(&mut self.store, event)?;
        if let Some(entry) = HistoryEntry::from_outcome(&outcome) {
            self.history.record(entry);
        }
        match outcome {
            DropOutcome::CardMoved(moved) => self.notify(BoardChange::CardMoved(moved)),
            DropOutcome::ColumnsReordered {
                column_id,
                from,
                to,
            } => self.notify(BoardChange::ColumnsReordered {
                column_id,
                from,
                to,
            }),
            DropOutcome::Cancelled | DropOutcome::NoOp => {}
        }
        Some(outcome)
    }

    /// Revert the last recorded move.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&mut self.store) {
            Some(entry) => {
                self.notify(BoardChange::Undone(entry));
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone move.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(&mut self.store) {
            Some(entry) => {
                self.notify(BoardChange::Redone(entry));
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Collaborator edits
    // -----------------------------------------------------------------------

    pub fn add_column(&mut self, name: impl Into<String>) -> Option<ColumnId> {
        let id = self.store.add_column(name)?;
        self.notify(BoardChange::ColumnAdded(id));
        Some(id)
    }

    pub fn rename_column(&mut self, id: ColumnId, name: impl Into<String>) -> bool {
        let renamed = self.store.rename_column(id, name);
        if renamed {
            self.notify(BoardChange::ColumnRenamed(id));
        }
        renamed
    }

    /// Delete a column and every card in it.
    pub fn remove_column(&mut self, id: ColumnId) -> bool {
        let Some(removed) = self.store.remove_column(id) else {
            return false;
        };
        self.notify(BoardChange::ColumnRemoved {
            column_id: id,
            removed_cards: removed.cards.iter().map(|c| c.id).collect(),
        });
        true
    }

    pub fn add_card(&mut self, column: ColumnId, draft: LeadDraft) -> Option<CardId> {
        let id = self.store.add_card(column, draft)?;
        self.notify(BoardChange::CardAdded(id));
        Some(id)
    }

    pub fn update_card(&mut self, id: CardId, draft: LeadDraft) -> bool {
        let updated = self.store.update_card(id, draft);
        if updated {
            self.notify(BoardChange::CardUpdated(id));
        }
        updated
    }

    pub fn remove_card(&mut self, id: CardId) -> bool {
        let removed = self.store.remove_card(id).is_some();
        if removed {
            self.notify(BoardChange::CardRemoved(id));
        }
        removed
    }

    pub fn add_comment(&mut self, id: CardId, text: impl Into<String>) -> bool {
        let added = self.store.add_comment(id, text);
        if added {
            self.notify(BoardChange::CommentAdded(id));
        }
        added
    }

    fn notify(&mut self, change: BoardChange) {
        debug!(target: "leadflow.session", ?change, "board changed");
        self.observer.board_changed(&self.store, &change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::layout::BoardLayout;
    use leadflow_core::{DragItem, Point};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session() -> (BoardSession, Rc<RefCell<Vec<BoardChange>>>) {
        let config = BoardConfig {
            default_columns: vec!["A".into(), "B".into()],
            seed_leads: false,
            ..BoardConfig::default()
        };
        let store = crate::fixtures::seed_board(&config, Box::new(ManualClock::new(0)));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let session = BoardSession::new(store, &config).with_observer(
            move |_: &BoardStore, change: &BoardChange| sink.borrow_mut().push(change.clone()),
        );
        (session, seen)
    }

    fn drag(session: &mut BoardSession, item: DragItem, to: Point) -> Option<DropOutcome> {
        let geometry = BoardLayout::default().geometry(session.store(), item, to)?;
        session.handle_drag(&DragEvent::Start { item });
        session.handle_drag(&DragEvent::End {
            geometry: Some(geometry),
        })
    }

    #[test]
    fn edits_notify_the_observer() {
        let (mut session, seen) = session();
        let a = session.store().columns()[0].id;
        let p = session.add_card(a, LeadDraft::new("p", "1")).unwrap();
        assert!(session.add_comment(p, "called, no answer"));
        assert!(session.rename_column(a, "Inbox"));
        assert!(!session.rename_column(ColumnId(999), "x"));

        assert_eq!(
            *seen.borrow(),
            [
                BoardChange::CardAdded(p),
                BoardChange::CommentAdded(p),
                BoardChange::ColumnRenamed(a),
            ]
        );
    }

    #[test]
    fn drop_records_history_and_notifies() {
        let (mut session, seen) = session();
        let a = session.store().columns()[0].id;
        let b = session.store().columns()[1].id;
        let p = session.add_card(a, LeadDraft::new("p", "1")).unwrap();
        seen.borrow_mut().clear();

        let outcome = drag(&mut session, DragItem::Card(p), Point::new(45, 10)).unwrap();
        assert!(outcome.changed_board());
        assert_eq!(session.store().card(p).unwrap().column_id, b);
        assert_eq!(session.history().undo_len(), 1);
        assert!(matches!(seen.borrow()[0], BoardChange::CardMoved(_)));

        assert!(session.undo());
        assert_eq!(session.store().card(p).unwrap().column_id, a);
        assert!(session.redo());
        assert_eq!(session.store().card(p).unwrap().column_id, b);
        assert!(!session.redo());
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn cancelled_drop_is_silent() {
        let (mut session, seen) = session();
        let a = session.store().columns()[0].id;
        session.add_card(a, LeadDraft::new("p", "1"));
        seen.borrow_mut().clear();

        let p = session.store().cards()[0].id;
        session.handle_drag(&DragEvent::Start {
            item: DragItem::Card(p),
        });
        assert_eq!(
            session.handle_drag(&DragEvent::End { geometry: None }),
            Some(DropOutcome::Cancelled)
        );
        assert!(seen.borrow().is_empty());
        assert!(!session.history().can_undo());
    }

    #[test]
    fn remove_column_reports_cascaded_cards() {
        let (mut session, seen) = session();
        let b = session.store().columns()[1].id;
        let s = session.add_card(b, LeadDraft::new("s", "1")).unwrap();
        let t = session.add_card(b, LeadDraft::new("t", "2")).unwrap();
        assert!(session.remove_column(b));
        assert_eq!(
            seen.borrow().last(),
            Some(&BoardChange::ColumnRemoved {
                column_id: b,
                removed_cards: vec![s, t],
            })
        );
        assert!(session.store().cards().is_empty());
    }
}
