#![forbid(unsafe_code)]

//! Insertion indicator: where a dragged card would land if released now.
//!
//! The indicator is recomputed on every pointer move of a card drag. It drives
//! the visual insertion line and is also the source of truth for the final
//! insertion point when the card is dropped.
//!
//! # Rules
//!
//! 1. Over another card: that card's column and index. `Before` when the
//!    pointer is above the hovered card's vertical midpoint, `After`
//!    otherwise.
//! 2. Over a column container: for a different column, `(0, Before)` when it
//!    is empty and `(last, After)` otherwise. Over the card's own column the
//!    indicator is cleared.
//! 3. Over nothing: cleared.

use leadflow_core::{DragGeometry, DropTarget};

use crate::model::{CardId, ColumnId};
use crate::store::BoardStore;

/// Side of the reference card the insertion line is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Before,
    After,
}

/// Whether the drop stays in the dragged card's column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorKind {
    SameColumn,
    CrossColumn,
}

/// Transient insertion marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionIndicator {
    pub column_id: ColumnId,
    /// Index of the reference card in the column, counted with the dragged
    /// card still in place.
    pub index: usize,
    pub position: InsertPosition,
    pub kind: IndicatorKind,
}

impl InsertionIndicator {
    /// Index to hand to [`BoardStore::move_card`] for this indicator.
    ///
    /// `source` is the dragged card's current `(column, index)`. Inside the
    /// same column, taking the card out first shifts everything after it up
    /// by one, so the raw slot is corrected.
    #[must_use]
    pub fn target_index(&self, source: Option<(ColumnId, usize)>) -> usize {
        let raw = match self.position {
            InsertPosition::Before => self.index,
            InsertPosition::After => self.index + 1,
        };
        match source {
            Some((column, from)) if column == self.column_id && from < raw => raw - 1,
            _ => raw,
        }
    }
}

/// Compute the indicator for `card` hovering `over`.
///
/// Returns `None` whenever no insertion line should be shown, including
/// lookup misses (unknown card, unknown target, hovered card without
/// registered bounds).
#[must_use]
pub fn compute_indicator(
    board: &BoardStore,
    card: CardId,
    over: Option<DropTarget>,
    geometry: &DragGeometry,
) -> Option<InsertionIndicator> {
    let (source_column, _) = board.card_position(card)?;

    match over? {
        DropTarget::Card(hovered) if hovered == card => None,
        DropTarget::Card(hovered) => {
            let (column_id, index) = board.card_position(hovered)?;
            let rect = geometry.rect_of(DropTarget::Card(hovered))?;
            let position = if rect.is_above_midpoint(geometry.pointer.y) {
                InsertPosition::Before
            } else {
                InsertPosition::After
            };
            Some(InsertionIndicator {
                column_id,
                index,
                position,
                kind: kind_for(source_column, column_id),
            })
        }
        DropTarget::Column(column_id) => {
            board.column_index(column_id)?;
            if column_id == source_column {
                return None;
            }
            let len = board.column_len(column_id);
            let (index, position) = match len {
                0 => (0, InsertPosition::Before),
                n => (n - 1, InsertPosition::After),
            };
            Some(InsertionIndicator {
                column_id,
                index,
                position,
                kind: IndicatorKind::CrossColumn,
            })
        }
    }
}

fn kind_for(source: ColumnId, target: ColumnId) -> IndicatorKind {
    if source == target {
        IndicatorKind::SameColumn
    } else {
        IndicatorKind::CrossColumn
    }
}
