#![forbid(unsafe_code)]

//! Drag lifecycle controller: turns drag events into board mutations.
//!
//! # State Machine
//!
//! ```text
//!            drag_start               drag_end / drag_cancel
//!   Idle ─────────────────▶ Dragging ───────────────────────▶ Idle
//!                            │    ▲
//!                            └────┘ drag_over (preview only)
//! ```
//!
//! Resolution happens synchronously inside `drag_end`; there is no state in
//! which a drop is half applied.
//!
//! # Invariants
//!
//! 1. The board is never mutated before `drag_end`.
//! 2. After `drag_end` or `drag_cancel`, the active item, the hovered target
//!    and the insertion indicator are all cleared, whatever the outcome.
//! 3. A release over nothing is a cancellation: no mutation.
//! 4. Dropping a card on a card always uses the before/after rule of the
//!    insertion indicator, in its own column as well as in other columns.
//!
//! # Failure Modes
//!
//! Unknown ids or missing bounds degrade to [`DropOutcome::NoOp`]. Nothing is
//! reported to the user.

use leadflow_core::{DragEvent, DragGeometry, DragItem, DropTarget, Droppable};
use tracing::debug;

use crate::collision::{CollisionStrategy, detect_collision};
use crate::indicator::{InsertionIndicator, compute_indicator};
use crate::model::{CardId, ColumnId};
use crate::store::{BoardStore, CardMove};

/// Where the dragged item was when the gesture started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOrigin {
    Card { column_id: ColumnId, index: usize },
    Column { index: usize },
}

/// The item currently being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveDrag {
    pub item: DragItem,
    pub origin: DragOrigin,
}

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(ActiveDrag),
}

/// What a finished gesture did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Released over nothing, or explicitly cancelled.
    Cancelled,
    /// Released over a target, but nothing needed to change.
    NoOp,
    CardMoved(CardMove),
    ColumnsReordered {
        column_id: ColumnId,
        from: usize,
        to: usize,
    },
}

impl DropOutcome {
    /// Whether the board changed.
    #[must_use]
    pub fn changed_board(&self) -> bool {
        matches!(self, Self::CardMoved(_) | Self::ColumnsReordered { .. })
    }
}

/// Orchestrates one drag gesture at a time.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
    over: Option<DropTarget>,
    indicator: Option<InsertionIndicator>,
    strategy: CollisionStrategy,
}

impl DragController {
    /// Create an idle controller.
    #[must_use]
    pub fn new(strategy: CollisionStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn state(&self) -> DragState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// The target under the dragged item, as of the last `drag_over`.
    #[must_use]
    pub fn over(&self) -> Option<DropTarget> {
        self.over
    }

    /// The insertion line to render, if any.
    #[must_use]
    pub fn indicator(&self) -> Option<InsertionIndicator> {
        self.indicator
    }

    /// Dispatch one event. Returns the outcome when the gesture finished.
    pub fn handle(&mut self, board: &mut BoardStore, event: &DragEvent) -> Option<DropOutcome> {
        match event {
            DragEvent::Start { item } => {
                self.drag_start(board, *item);
                None
            }
            DragEvent::Over { geometry } => {
                self.drag_over(board, geometry);
                None
            }
            DragEvent::End { geometry } => Some(self.drag_end(board, geometry.as_ref())),
            DragEvent::Cancel => self.drag_cancel().then_some(DropOutcome::Cancelled),
        }
    }

    /// Idle → Dragging. Records the item and where it started.
    ///
    /// Returns `false` and stays idle when the item is not on the board.
    pub fn drag_start(&mut self, board: &BoardStore, item: DragItem) -> bool {
        self.reset();
        let origin = match item {
            DragItem::Card(card) => board
                .card_position(card)
                .map(|(column_id, index)| DragOrigin::Card { column_id, index }),
            DragItem::Column(column) => board
                .column_index(column)
                .map(|index| DragOrigin::Column { index }),
        };
        let Some(origin) = origin else {
            debug!(target: "leadflow.drag", ?item, "drag start on unknown item ignored");
            return false;
        };
        debug!(target: "leadflow.drag", ?item, ?origin, "drag started");
        self.state = DragState::Dragging(ActiveDrag { item, origin });
        true
    }

    /// Preview step: update the hovered target and the indicator.
    pub fn drag_over(&mut self, board: &BoardStore, geometry: &DragGeometry) {
        let DragState::Dragging(active) = self.state else {
            return;
        };
        let over = self.detect(board, active.item, geometry);
        self.over = over;
        self.indicator = match active.item {
            DragItem::Card(card) => compute_indicator(board, card, over, geometry),
            DragItem::Column(_) => None,
        };
    }

    /// Dragging → Idle, applying the drop.
    ///
    /// When `geometry` is given it is treated as a final `drag_over` before
    /// resolving; otherwise the last preview is used.
    pub fn drag_end(
        &mut self,
        board: &mut BoardStore,
        geometry: Option<&DragGeometry>,
    ) -> DropOutcome {
        if let Some(geometry) = geometry {
            self.drag_over(board, geometry);
        }
        let state = std::mem::take(&mut self.state);
        let over = self.over.take();
        let indicator = self.indicator.take();

        let DragState::Dragging(active) = state else {
            return DropOutcome::NoOp;
        };
        let Some(over) = over else {
            debug!(target: "leadflow.drag", item = ?active.item, "released over nothing");
            return DropOutcome::Cancelled;
        };

        let outcome = match active.item {
            DragItem::Card(card) => drop_card(board, card, over, indicator),
            DragItem::Column(column) => drop_column(board, column, over),
        };
        debug!(target: "leadflow.drag", item = ?active.item, ?over, ?outcome, "drag ended");
        outcome
    }

    /// Abort the gesture. Returns whether a drag was in progress.
    pub fn drag_cancel(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.reset();
        if was_dragging {
            debug!(target: "leadflow.drag", "drag cancelled");
        }
        was_dragging
    }

    fn reset(&mut self) {
        self.state = DragState::Idle;
        self.over = None;
        self.indicator = None;
    }

    fn detect(
        &self,
        board: &BoardStore,
        item: DragItem,
        geometry: &DragGeometry,
    ) -> Option<DropTarget> {
        match item {
            // Cards compete with cards; an empty column stands in for the
            // cards it does not have.
            DragItem::Card(card) => detect_collision(
                item,
                geometry.active_rect,
                &geometry.droppables,
                |target| match target {
                    DropTarget::Card(_) => true,
                    DropTarget::Column(column) => board
                        .cards_in_column(column)
                        .iter()
                        .all(|c| c.id == card),
                },
                self.strategy,
            ),
            // The dragged column's own cards travel with it.
            DragItem::Column(column) => {
                let candidates: Vec<Droppable> = geometry
                    .droppables
                    .iter()
                    .filter(|d| match d.target {
                        DropTarget::Card(card) => {
                            board.card(card).is_some_and(|c| c.column_id != column)
                        }
                        DropTarget::Column(_) => true,
                    })
                    .copied()
                    .collect();
                detect_collision(
                    item,
                    geometry.active_rect,
                    &candidates,
                    DropTarget::is_column,
                    self.strategy,
                )
            }
        }
    }
}

fn drop_card(
    board: &mut BoardStore,
    card: CardId,
    over: DropTarget,
    indicator: Option<InsertionIndicator>,
) -> DropOutcome {
    let moved = match indicator {
        Some(indicator) => {
            let target = indicator.target_index(board.card_position(card));
            board.move_card(card, indicator.column_id, target)
        }
        None => match over {
            DropTarget::Column(column) => board.move_card(card, column, usize::MAX),
            DropTarget::Card(hovered) => {
                match (board.card_position(card), board.card_position(hovered)) {
                    // No bounds for the hovered card: take its slot.
                    (Some((from, _)), Some((to, index))) if from == to => {
                        board.move_card(card, to, index)
                    }
                    (Some(_), Some((to, _))) => board.move_card(card, to, usize::MAX),
                    _ => None,
                }
            }
        },
    };
    moved.map_or(DropOutcome::NoOp, DropOutcome::CardMoved)
}

fn drop_column(board: &mut BoardStore, column: ColumnId, over: DropTarget) -> DropOutcome {
    let target_column = match over {
        DropTarget::Column(target) => Some(target),
        DropTarget::Card(card) => board.card(card).map(|c| c.column_id),
    };
    let (Some(from), Some(to)) = (
        board.column_index(column),
        target_column.and_then(|c| board.column_index(c)),
    ) else {
        return DropOutcome::NoOp;
    };
    if board.reorder_columns(from, to) {
        DropOutcome::ColumnsReordered {
            column_id: column,
            from,
            to,
        }
    } else {
        DropOutcome::NoOp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::indicator::{IndicatorKind, InsertPosition};
    use crate::model::LeadDraft;
    use leadflow_core::{Point, Rect};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    struct Board {
        store: BoardStore,
        a: ColumnId,
        b: ColumnId,
        p: CardId,
        q: CardId,
        r: CardId,
    }

    /// A = [p, q, r] at x 0..30, B empty at x 30..60. Cards are 3 rows tall
    /// starting at y = 1.
    fn board() -> Board {
        let mut store = BoardStore::new(Box::new(ManualClock::new(0)));
        let a = store.add_column("A").unwrap();
        let b = store.add_column("B").unwrap();
        let p = store.add_card(a, LeadDraft::new("p", "1")).unwrap();
        let q = store.add_card(a, LeadDraft::new("q", "2")).unwrap();
        let r = store.add_card(a, LeadDraft::new("r", "3")).unwrap();
        Board {
            store,
            a,
            b,
            p,
            q,
            r,
        }
    }

    fn geometry(f: &Board, pointer: Point) -> DragGeometry {
        let active = Rect::new(
            pointer.x.saturating_sub(10),
            pointer.y.saturating_sub(1),
            20,
            3,
        );
        DragGeometry::new(pointer, active).with_droppables([
            Droppable::column(f.a, Rect::new(0, 0, 30, 20)),
            Droppable::column(f.b, Rect::new(30, 0, 30, 20)),
            Droppable::card(f.p, Rect::new(1, 1, 28, 3)),
            Droppable::card(f.q, Rect::new(1, 4, 28, 3)),
            Droppable::card(f.r, Rect::new(1, 7, 28, 3)),
        ])
    }

    fn order(store: &BoardStore, column: ColumnId) -> Vec<CardId> {
        store.cards_in_column(column).iter().map(|c| c.id).collect()
    }

    #[test]
    fn start_on_unknown_item_stays_idle() {
        let f = board();
        let mut ctl = DragController::default();
        assert!(!ctl.drag_start(&f.store, DragItem::Card(CardId(404))));
        assert_eq!(ctl.state(), DragState::Idle);
    }

    #[test]
    fn start_records_origin() {
        let f = board();
        let mut ctl = DragController::default();
        assert!(ctl.drag_start(&f.store, DragItem::Card(f.q)));
        assert_eq!(
            ctl.state(),
            DragState::Dragging(ActiveDrag {
                item: DragItem::Card(f.q),
                origin: DragOrigin::Card {
                    column_id: f.a,
                    index: 1
                },
            })
        );
    }

    #[test]
    fn over_does_not_mutate_and_tracks_indicator() {
        let mut f = board();
        let mut ctl = DragController::default();
        ctl.drag_start(&f.store, DragItem::Card(f.p));
        let before = f.store.cards().to_vec();

        ctl.drag_over(&f.store, &geometry(&f, Point::new(15, 7)));
        assert_eq!(ctl.over(), Some(DropTarget::Card(f.r)));
        let indicator = ctl.indicator().unwrap();
        assert_eq!(indicator.position, InsertPosition::Before);
        assert_eq!(indicator.kind, IndicatorKind::SameColumn);
        assert_eq!(f.store.cards(), before.as_slice());

        // Moving into the empty column retargets the indicator.
        ctl.drag_over(&f.store, &geometry(&f, Point::new(45, 10)));
        assert_eq!(ctl.over(), Some(DropTarget::Column(f.b)));
        assert_eq!(ctl.indicator().unwrap().kind, IndicatorKind::CrossColumn);

        let outcome = ctl.drag_end(&mut f.store, None);
        assert!(outcome.changed_board());
        assert_eq!(order(&f.store, f.b), [f.p]);
    }

    #[test]
    fn drop_on_card_below_midpoint_inserts_after() {
        let mut f = board();
        let mut ctl = DragController::default();
        ctl.drag_start(&f.store, DragItem::Card(f.p));
        let release = geometry(&f, Point::new(15, 9));
        let outcome = ctl.drag_end(&mut f.store, Some(&release));
        assert!(matches!(outcome, DropOutcome::CardMoved(_)));
        assert_eq!(order(&f.store, f.a), [f.q, f.r, f.p]);
    }

    #[test]
    fn drop_on_own_slot_is_noop() {
        let mut f = board();
        let mut ctl = DragController::default();
        ctl.drag_start(&f.store, DragItem::Card(f.q));
        // Upper half of r: q already sits right before it.
        let release = geometry(&f, Point::new(15, 7));
        let outcome = ctl.drag_end(&mut f.store, Some(&release));
        assert_eq!(outcome, DropOutcome::NoOp);
        assert_eq!(order(&f.store, f.a), [f.p, f.q, f.r]);
    }

    #[test]
    fn release_over_nothing_cancels_and_clears() {
        let mut f = board();
        let mut ctl = DragController::default();
        ctl.drag_start(&f.store, DragItem::Card(f.p));
        ctl.drag_over(&f.store, &geometry(&f, Point::new(15, 7)));
        assert!(ctl.indicator().is_some());

        let empty = DragGeometry::new(Point::new(200, 200), Rect::new(190, 199, 20, 3));
        let outcome = ctl.drag_end(&mut f.store, Some(&empty));
        assert_eq!(outcome, DropOutcome::Cancelled);
        assert_eq!(ctl.state(), DragState::Idle);
        assert_eq!(ctl.indicator(), None);
        assert_eq!(ctl.over(), None);
        assert_eq!(order(&f.store, f.a), [f.p, f.q, f.r]);
    }

    #[test]
    fn end_without_start_is_noop() {
        let mut f = board();
        let mut ctl = DragController::default();
        assert_eq!(ctl.drag_end(&mut f.store, None), DropOutcome::NoOp);
    }

    #[test]
    fn card_deleted_mid_drag_degrades_to_noop() {
        let mut f = board();
        let mut ctl = DragController::default();
        ctl.drag_start(&f.store, DragItem::Card(f.p));
        ctl.drag_over(&f.store, &geometry(&f, Point::new(45, 10)));
        f.store.remove_card(f.p);
        assert_eq!(ctl.drag_end(&mut f.store, None), DropOutcome::NoOp);
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn cancel_event_clears_state() {
        let mut f = board();
        let mut ctl = DragController::default();
        ctl.handle(
            &mut f.store,
            &DragEvent::Start {
                item: DragItem::Card(f.p),
            },
        );
        let over = DragEvent::Over {
            geometry: geometry(&f, Point::new(15, 7)),
        };
        ctl.handle(&mut f.store, &over);
        assert_eq!(
            ctl.handle(&mut f.store, &DragEvent::Cancel),
            Some(DropOutcome::Cancelled)
        );
        assert_eq!(ctl.indicator(), None);
        assert_eq!(ctl.handle(&mut f.store, &DragEvent::Cancel), None);
    }

    #[test]
    fn column_drag_ignores_its_own_cards() {
        let mut f = board();
        let mut ctl = DragController::default();
        ctl.drag_start(&f.store, DragItem::Column(f.a));
        let geometry = DragGeometry::new(Point::new(40, 2), Rect::new(25, 0, 30, 20))
            .with_droppables([
                Droppable::column(f.a, Rect::new(0, 0, 30, 20)),
                Droppable::column(f.b, Rect::new(30, 0, 30, 20)),
                Droppable::card(f.p, Rect::new(26, 1, 28, 3)),
            ]);
        let outcome = ctl.drag_end(&mut f.store, Some(&geometry));
        assert_eq!(
            outcome,
            DropOutcome::ColumnsReordered {
                column_id: f.a,
                from: 0,
                to: 1
            }
        );
        let ids: Vec<ColumnId> = f.store.columns().iter().map(|c| c.id).collect();
        assert_eq!(ids, [f.b, f.a]);
    }

    #[test]
    fn column_drag_over_a_card_lands_on_its_column() {
        let mut f = board();
        let s = f.store.add_card(f.b, LeadDraft::new("s", "4")).unwrap();
        let mut ctl = DragController::default();
        ctl.drag_start(&f.store, DragItem::Column(f.a));
        // Only cards are registered, so the preferred pass finds nothing and
        // the intersection fallback picks the card.
        let geometry = DragGeometry::new(Point::new(40, 2), Rect::new(25, 0, 30, 20))
            .with_droppables([
                Droppable::card(f.p, Rect::new(1, 1, 28, 3)),
                Droppable::card(s, Rect::new(31, 1, 28, 3)),
            ]);
        ctl.drag_over(&f.store, &geometry);
        assert_eq!(ctl.over(), Some(DropTarget::Card(s)));
        assert_eq!(ctl.indicator(), None);

        let outcome = ctl.drag_end(&mut f.store, None);
        assert_eq!(
            outcome,
            DropOutcome::ColumnsReordered {
                column_id: f.a,
                from: 0,
                to: 1
            }
        );
        let ids: Vec<ColumnId> = f.store.columns().iter().map(|c| c.id).collect();
        assert_eq!(ids, [f.b, f.a]);
    }

    #[test]
    fn drop_without_indicator_on_same_column_card_takes_its_slot() {
        let mut f = board();
        let outcome = drop_card(&mut f.store, f.p, DropTarget::Card(f.q), None);
        assert!(outcome.changed_board());
        assert_eq!(order(&f.store, f.a), [f.q, f.p, f.r]);
    }

    #[test]
    fn drop_without_indicator_on_other_column_card_appends() {
        let mut f = board();
        let s = f.store.add_card(f.b, LeadDraft::new("s", "4")).unwrap();
        let t = f.store.add_card(f.b, LeadDraft::new("t", "5")).unwrap();
        let outcome = drop_card(&mut f.store, f.q, DropTarget::Card(s), None);
        let DropOutcome::CardMoved(moved) = outcome else {
            panic!("expected a card move, got {outcome:?}");
        };
        assert_eq!((moved.to_column, moved.to_index), (f.b, 2));
        assert_eq!(order(&f.store, f.b), [s, t, f.q]);
        assert_eq!(order(&f.store, f.a), [f.p, f.r]);
    }

    #[test]
    fn drop_without_indicator_on_own_column_moves_to_end() {
        let mut f = board();
        let outcome = drop_card(&mut f.store, f.p, DropTarget::Column(f.a), None);
        assert!(outcome.changed_board());
        assert_eq!(order(&f.store, f.a), [f.q, f.r, f.p]);

        // Already last: nothing to do.
        let again = drop_card(&mut f.store, f.p, DropTarget::Column(f.a), None);
        assert_eq!(again, DropOutcome::NoOp);
    }

    #[test]
    fn drop_without_indicator_on_vanished_card_is_noop() {
        let mut f = board();
        let before = f.store.cards().to_vec();
        let outcome = drop_card(&mut f.store, f.p, DropTarget::Card(CardId(404)), None);
        assert_eq!(outcome, DropOutcome::NoOp);
        assert_eq!(f.store.cards(), before.as_slice());
    }

    // -----------------------------------------------------------------------
    // Tracing
    // -----------------------------------------------------------------------

    #[derive(Debug, Clone)]
    struct CapturedEvent {
        target: String,
        message: String,
    }

    struct EventCapture(Arc<Mutex<Vec<CapturedEvent>>>);

    struct MessageVisitor(HashMap<String, String>);

    impl tracing::field::Visit for MessageVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            self.0
                .insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut visitor = MessageVisitor(HashMap::new());
            event.record(&mut visitor);
            self.0.lock().unwrap().push(CapturedEvent {
                target: event.metadata().target().to_string(),
                message: visitor.0.remove("message").unwrap_or_default(),
            });
        }
    }

    #[test]
    fn cancelled_release_is_logged_on_drag_target() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(EventCapture(events.clone()));

        tracing::subscriber::with_default(subscriber, || {
            let mut f = board();
            let mut ctl = DragController::default();
            ctl.drag_start(&f.store, DragItem::Card(f.p));
            ctl.drag_end(&mut f.store, None);
        });

        let events = events.lock().unwrap();
        assert!(
            events
                .iter()
                .any(|e| e.target == "leadflow.drag" && e.message == "released over nothing"),
            "captured: {events:?}"
        );
    }
}
