#![forbid(unsafe_code)]

//! Drag events delivered by the host UI runtime.
//!
//! A gesture is always `Start` → zero or more `Over` → `End` or `Cancel`.
//! Every `Over`/`End` carries the full geometry of the moment: the pointer,
//! the dragged element's current rectangle, and every registered droppable.

use crate::geometry::{Point, Rect};
use crate::id::{CardId, ColumnId};

/// The element being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "id", rename_all = "snake_case"))]
pub enum DragItem {
    Card(CardId),
    Column(ColumnId),
}

impl DragItem {
    /// The drop target that represents this same element.
    #[must_use]
    pub const fn as_target(self) -> DropTarget {
        match self {
            Self::Card(id) => DropTarget::Card(id),
            Self::Column(id) => DropTarget::Column(id),
        }
    }
}

/// Something the dragged element can be dropped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "id", rename_all = "snake_case"))]
pub enum DropTarget {
    Card(CardId),
    Column(ColumnId),
}

impl DropTarget {
    /// True when the target is a column container or header.
    #[must_use]
    pub const fn is_column(self) -> bool {
        matches!(self, Self::Column(_))
    }
}

/// A registered droppable region and its current bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Droppable {
    pub target: DropTarget,
    pub rect: Rect,
}

impl Droppable {
    /// Create a droppable.
    #[must_use]
    pub const fn new(target: DropTarget, rect: Rect) -> Self {
        Self { target, rect }
    }

    /// Droppable for a card.
    #[must_use]
    pub const fn card(id: CardId, rect: Rect) -> Self {
        Self::new(DropTarget::Card(id), rect)
    }

    /// Droppable for a column.
    #[must_use]
    pub const fn column(id: ColumnId, rect: Rect) -> Self {
        Self::new(DropTarget::Column(id), rect)
    }
}

/// Pointer-derived geometry sampled at one moment of a drag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragGeometry {
    /// Current pointer position.
    pub pointer: Point,
    /// Current bounds of the dragged element (follows the pointer).
    pub active_rect: Rect,
    /// Droppables registered by the host, in registration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub droppables: Vec<Droppable>,
}

impl DragGeometry {
    /// Create geometry for the given pointer and active rectangle.
    #[must_use]
    pub fn new(pointer: Point, active_rect: Rect) -> Self {
        Self {
            pointer,
            active_rect,
            droppables: Vec::new(),
        }
    }

    /// Register a droppable.
    #[must_use]
    pub fn with_droppable(mut self, droppable: Droppable) -> Self {
        self.droppables.push(droppable);
        self
    }

    /// Register several droppables.
    #[must_use]
    pub fn with_droppables(mut self, droppables: impl IntoIterator<Item = Droppable>) -> Self {
        self.droppables.extend(droppables);
        self
    }

    /// Bounds of a registered droppable, if present.
    #[must_use]
    pub fn rect_of(&self, target: DropTarget) -> Option<Rect> {
        self.droppables
            .iter()
            .find(|d| d.target == target)
            .map(|d| d.rect)
    }
}

/// One step of a drag gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "phase", rename_all = "snake_case"))]
pub enum DragEvent {
    /// Pointer pressed on a draggable and moved past the activation threshold.
    Start { item: DragItem },
    /// Pointer moved while dragging.
    Over { geometry: DragGeometry },
    /// Pointer released. `None` when the host reports no geometry.
    End { geometry: Option<DragGeometry> },
    /// Gesture aborted (Escape, focus loss).
    Cancel,
}
