#![forbid(unsafe_code)]

//! Host-side geometry of a plain column grid.
//!
//! Columns sit side by side, each `column_width` cells wide, with a one-cell
//! border. Cards stack inside the border, `card_height` rows each:
//!
//! ```text
//!  x=0                        x=30
//!  ┌────────────────────────────┐┌──────
//!  │ card 0            (y 1..4) ││
//!  │ card 1            (y 4..7) ││
//!  │ ...                        ││
//!  └────────────────────────────┘└──────
//! ```
//!
//! A real host measures its widgets and reports droppables itself. This
//! layout stands in for one when replaying scripted gestures and in tests.

use leadflow_core::{DragGeometry, DragItem, Droppable, Point, Rect};
use serde::{Deserialize, Serialize};

use crate::store::BoardStore;

/// Fixed-size column grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardLayout {
    pub origin_x: u16,
    pub origin_y: u16,
    pub column_width: u16,
    pub column_height: u16,
    pub card_height: u16,
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self {
            origin_x: 0,
            origin_y: 0,
            column_width: 30,
            column_height: 23,
            card_height: 3,
        }
    }
}

impl BoardLayout {
    /// Problems that would make the grid degenerate.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.column_width < 3 {
            errors.push(format!(
                "layout.column_width must be at least 3, got {}",
                self.column_width
            ));
        }
        if self.column_height < 3 {
            errors.push(format!(
                "layout.column_height must be at least 3, got {}",
                self.column_height
            ));
        }
        if self.card_height == 0 {
            errors.push("layout.card_height must be at least 1".to_string());
        }
        errors
    }

    /// Bounds of the column at `index`.
    #[must_use]
    pub fn column_rect(&self, index: usize) -> Rect {
        let x = u32::from(self.origin_x) + index as u32 * u32::from(self.column_width);
        Rect::new(
            clamp_u16(x),
            self.origin_y,
            self.column_width,
            self.column_height,
        )
    }

    /// Bounds of the card at `card_index` inside the column at
    /// `column_index`.
    #[must_use]
    pub fn card_rect(&self, column_index: usize, card_index: usize) -> Rect {
        let column = self.column_rect(column_index);
        let y = u32::from(column.y) + 1 + card_index as u32 * u32::from(self.card_height);
        Rect::new(
            column.x.saturating_add(1),
            clamp_u16(y),
            column.width.saturating_sub(2),
            self.card_height,
        )
    }

    /// Every droppable on the board: columns first, then cards column by
    /// column.
    #[must_use]
    pub fn droppables(&self, board: &BoardStore) -> Vec<Droppable> {
        let mut droppables: Vec<Droppable> = board
            .columns()
            .iter()
            .enumerate()
            .map(|(i, column)| Droppable::column(column.id, self.column_rect(i)))
            .collect();
        for (i, column) in board.columns().iter().enumerate() {
            for (j, card) in board.cards_in_column(column.id).into_iter().enumerate() {
                droppables.push(Droppable::card(card.id, self.card_rect(i, j)));
            }
        }
        droppables
    }

    /// Current bounds of a draggable item.
    #[must_use]
    pub fn rect_of(&self, board: &BoardStore, item: DragItem) -> Option<Rect> {
        match item {
            DragItem::Card(card) => {
                let (column, index) = board.card_position(card)?;
                Some(self.card_rect(board.column_index(column)?, index))
            }
            DragItem::Column(column) => Some(self.column_rect(board.column_index(column)?)),
        }
    }

    /// Geometry of `item` dragged so that it is centered on `pointer`.
    #[must_use]
    pub fn geometry(
        &self,
        board: &BoardStore,
        item: DragItem,
        pointer: Point,
    ) -> Option<DragGeometry> {
        let rect = self.rect_of(board, item)?;
        let origin = Point::new(
            pointer.x.saturating_sub(rect.width / 2),
            pointer.y.saturating_sub(rect.height / 2),
        );
        Some(
            DragGeometry::new(pointer, rect.moved_to(origin))
                .with_droppables(self.droppables(board)),
        )
    }

    /// The draggable under `point`: a card when one is hit, otherwise the
    /// column.
    #[must_use]
    pub fn hit_test(&self, board: &BoardStore, point: Point) -> Option<DragItem> {
        let (index, column) = board
            .columns()
            .iter()
            .enumerate()
            .find(|(i, _)| self.column_rect(*i).contains(point))?;
        let cards = board.cards_in_column(column.id);
        let hit = (0..cards.len()).find(|&j| self.card_rect(index, j).contains(point));
        Some(match hit {
            Some(j) => DragItem::Card(cards[j].id),
            None => DragItem::Column(column.id),
        })
    }
}

fn clamp_u16(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}
