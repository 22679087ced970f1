#![forbid(unsafe_code)]

//! Property tests for [`BoardStore`] invariants.
//!
//! Validates:
//! - Random edit/move/reorder sequences never leave orphaned cards, duplicate
//!   ids, or ids at or above the counter.
//! - Per-column orders partition the flat card list.
//! - Moving a card to where it already is, or reordering a column onto
//!   itself, leaves the state identical.
//! - Removing a column removes all of its cards and nothing else.
//! - Cross-column moves stamp the clock; same-column moves do not.
//! - Undoing every recorded move restores every column's order and the
//!   entry timestamps.
//! - Random drag gestures always end idle with the indicator cleared.

use proptest::prelude::*;

use leadflow_board::{
    BoardLayout, BoardStore, Card, CardId, Column, ColumnId, DragController, HistoryConfig,
    HistoryEntry, LeadDraft, ManualClock, MoveHistory,
};
use leadflow_core::{DragEvent, DragItem, Point};

// ============================================================================
// Strategy helpers
// ============================================================================

/// Operations on a board. Indices are reduced modulo the current sizes.
#[derive(Debug, Clone)]
enum Op {
    AddColumn,
    RemoveColumn(usize),
    AddCard(usize),
    RemoveCard(usize),
    MoveCard {
        card: usize,
        column: usize,
        index: usize,
    },
    MoveUnknown(u64),
    ReorderColumns(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::AddColumn),
        1 => any::<usize>().prop_map(Op::RemoveColumn),
        3 => any::<usize>().prop_map(Op::AddCard),
        1 => any::<usize>().prop_map(Op::RemoveCard),
        5 => (any::<usize>(), any::<usize>(), 0usize..12)
            .prop_map(|(card, column, index)| Op::MoveCard { card, column, index }),
        1 => (1_000u64..2_000).prop_map(Op::MoveUnknown),
        2 => (0usize..6, 0usize..6).prop_map(|(s, t)| Op::ReorderColumns(s, t)),
    ]
}

fn ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 1..=max_len)
}

fn board_with(clock: &ManualClock, columns: usize, cards: usize) -> BoardStore {
    let mut board = BoardStore::new(Box::new(clock.clone()));
    let ids: Vec<ColumnId> = (0..columns)
        .map(|i| board.add_column(format!("c{i}")).unwrap())
        .collect();
    for i in 0..cards {
        board.add_card(ids[i % ids.len()], LeadDraft::new(format!("lead {i}"), "0"));
    }
    board
}

fn column_at(board: &BoardStore, i: usize) -> Option<ColumnId> {
    let columns = board.columns();
    (!columns.is_empty()).then(|| columns[i % columns.len()].id)
}

fn card_at(board: &BoardStore, i: usize) -> Option<CardId> {
    let cards = board.cards();
    (!cards.is_empty()).then(|| cards[i % cards.len()].id)
}

fn apply(board: &mut BoardStore, op: &Op) {
    match *op {
        Op::AddColumn => {
            board.add_column("new");
        }
        Op::RemoveColumn(i) => {
            if let Some(id) = column_at(board, i) {
                board.remove_column(id);
            }
        }
        Op::AddCard(i) => {
            if let Some(id) = column_at(board, i) {
                board.add_card(id, LeadDraft::new("lead", "0"));
            }
        }
        Op::RemoveCard(i) => {
            if let Some(id) = card_at(board, i) {
                board.remove_card(id);
            }
        }
        Op::MoveCard { card, column, index } => {
            if let (Some(card), Some(column)) = (card_at(board, card), column_at(board, column)) {
                board.move_card(card, column, index);
            }
        }
        Op::MoveUnknown(id) => {
            let target = column_at(board, 0).unwrap_or(ColumnId(id));
            assert!(board.move_card(CardId(id), target, 0).is_none());
        }
        Op::ReorderColumns(s, t) => {
            board.reorder_columns(s, t);
        }
    }
}

fn state(board: &BoardStore) -> (Vec<Column>, Vec<Card>) {
    (board.columns().to_vec(), board.cards().to_vec())
}

/// Columns with their cards in order. Ignores how columns interleave in the
/// flat list.
fn per_column(board: &BoardStore) -> Vec<(Column, Vec<Card>)> {
    board
        .columns()
        .iter()
        .map(|c| {
            let cards = board.cards_in_column(c.id).into_iter().cloned().collect();
            (c.clone(), cards)
        })
        .collect()
}

// ============================================================================
// Invariant 1: Random sequences keep the board consistent
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn random_sequences_keep_invariants(ops in ops_strategy(60)) {
        let clock = ManualClock::new(0);
        let mut board = board_with(&clock, 3, 6);
        for op in &ops {
            clock.advance(1);
            apply(&mut board, op);
            let errors = board.check_invariants();
            prop_assert!(errors.is_empty(), "after {:?}: {:?}", op, errors);
        }

        // Per-column orders partition the flat list.
        let total: usize = board
            .columns()
            .iter()
            .map(|c| board.cards_in_column(c.id).len())
            .sum();
        prop_assert_eq!(total, board.cards().len());
        for column in board.columns() {
            for (index, card) in board.cards_in_column(column.id).iter().enumerate() {
                prop_assert_eq!(board.card_position(card.id), Some((column.id, index)));
            }
        }
    }
}

// ============================================================================
// Invariant 2: Idempotent no-op moves
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn moving_to_current_place_changes_nothing(
        ops in ops_strategy(30),
        pick in any::<usize>(),
        column in 0usize..8,
    ) {
        let clock = ManualClock::new(0);
        let mut board = board_with(&clock, 3, 6);
        for op in &ops {
            apply(&mut board, op);
        }
        clock.advance(10_000);

        let before = state(&board);
        if let Some(card) = card_at(&board, pick) {
            let (column_id, index) = board.card_position(card).unwrap();
            prop_assert!(board.move_card(card, column_id, index).is_none());
        }
        prop_assert!(!board.reorder_columns(column, column));
        prop_assert_eq!(state(&board), before);
    }
}

// ============================================================================
// Invariant 3: Cascade on column removal
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn removing_a_column_removes_exactly_its_cards(
        ops in ops_strategy(30),
        pick in any::<usize>(),
    ) {
        let clock = ManualClock::new(0);
        let mut board = board_with(&clock, 3, 6);
        for op in &ops {
            apply(&mut board, op);
        }
        let Some(victim) = column_at(&board, pick) else {
            return Ok(());
        };
        let survivors: Vec<Card> = board
            .cards()
            .iter()
            .filter(|c| c.column_id != victim)
            .cloned()
            .collect();

        let removed = board.remove_column(victim).unwrap();
        prop_assert!(removed.cards.iter().all(|c| c.column_id == victim));
        prop_assert!(board.cards().iter().all(|c| c.column_id != victim));
        prop_assert_eq!(board.cards(), survivors.as_slice());
    }
}

// ============================================================================
// Invariant 4: Timestamp rule
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn only_cross_column_moves_stamp_the_clock(
        pick in any::<usize>(),
        column in any::<usize>(),
        index in 0usize..8,
    ) {
        let clock = ManualClock::new(1_000);
        let mut board = board_with(&clock, 3, 7);
        clock.set(50_000);

        let card = card_at(&board, pick).unwrap();
        let target = column_at(&board, column).unwrap();
        let before = board.card(card).unwrap().column_entered_at;

        if let Some(moved) = board.move_card(card, target, index) {
            let after = board.card(card).unwrap().column_entered_at;
            if moved.crossed_columns() {
                prop_assert_eq!(after, 50_000);
            } else {
                prop_assert_eq!(after, before);
            }
            prop_assert_eq!(moved.previous_entered_at, before);
        }
    }
}

// ============================================================================
// Invariant 5: Undo restores the starting board
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn undo_all_moves_restores_start(
        moves in prop::collection::vec((any::<usize>(), any::<usize>(), 0usize..8), 1..25)
    ) {
        let clock = ManualClock::new(0);
        let mut board = board_with(&clock, 3, 7);
        let start = per_column(&board);
        let mut history = MoveHistory::new(HistoryConfig { max_depth: 64 });

        for (card, column, index) in moves {
            clock.advance(1_000);
            let card = card_at(&board, card).unwrap();
            let column = column_at(&board, column).unwrap();
            if let Some(moved) = board.move_card(card, column, index) {
                history.record(HistoryEntry::CardMove(moved));
            }
        }
        while history.undo(&mut board).is_some() {}
        prop_assert_eq!(per_column(&board), start);
    }
}

// ============================================================================
// Invariant 6: Drag gestures always end clean
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn drags_end_idle_and_consistent(
        gestures in prop::collection::vec(
            ((0u16..100, 0u16..30), prop::collection::vec((0u16..100, 0u16..30), 0..4)),
            1..15,
        )
    ) {
        let clock = ManualClock::new(0);
        let mut board = board_with(&clock, 3, 7);
        let layout = BoardLayout::default();
        let mut controller = DragController::default();

        for ((sx, sy), path) in gestures {
            let Some(item) = layout.hit_test(&board, Point::new(sx, sy)) else {
                continue;
            };
            controller.handle(&mut board, &DragEvent::Start { item });
            for &(x, y) in &path {
                if let Some(geometry) = layout.geometry(&board, item, Point::new(x, y)) {
                    controller.handle(&mut board, &DragEvent::Over { geometry });
                }
            }
            let end = path
                .last()
                .and_then(|&(x, y)| layout.geometry(&board, item, Point::new(x, y)));
            let outcome = controller.handle(&mut board, &DragEvent::End { geometry: end });

            prop_assert!(outcome.is_some());
            prop_assert!(!controller.is_dragging());
            prop_assert_eq!(controller.indicator(), None);
            prop_assert_eq!(controller.over(), None);
            let errors = board.check_invariants();
            prop_assert!(errors.is_empty(), "{:?}", errors);
            if let DragItem::Card(card) = item {
                prop_assert!(board.card(card).is_some());
            }
        }
    }
}
