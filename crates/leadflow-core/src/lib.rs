#![forbid(unsafe_code)]

//! Core: geometry and drag event types for the leadflow board.
//!
//! # Role in leadflow
//! `leadflow-core` is the input vocabulary. It knows nothing about columns
//! holding cards; it only describes what the host UI reports while a drag
//! gesture is in flight: which element is active, where the pointer is, and
//! which droppable regions exist.
//!
//! # How it fits in the system
//! `leadflow-board` consumes [`event::DragEvent`] values, runs collision
//! detection over [`event::Droppable`] rectangles, and mutates the board.

pub mod event;
pub mod geometry;
pub mod id;

pub use event::{DragEvent, DragGeometry, DragItem, DropTarget, Droppable};
pub use geometry::{Point, Rect};
pub use id::{CardId, ColumnId};
