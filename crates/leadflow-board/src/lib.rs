#![forbid(unsafe_code)]

//! Board: the lead board state and its drag-and-drop reordering.
//!
//! # Role in leadflow
//! `leadflow-board` owns the columns and cards of a CRM pipeline and turns
//! drag gestures reported by a host UI into reorderings. Everything here is
//! synchronous and single-threaded; the host serializes events.
//!
//! # How it fits in the system
//! The host feeds [`leadflow_core::DragEvent`]s into a [`BoardSession`],
//! which runs them through the [`DragController`]:
//!
//! ```text
//!   DragEvent ─▶ DragController ─▶ detect_collision ─▶ compute_indicator
//!                     │ (on drop)
//!                     ▼
//!                BoardStore ─▶ MoveHistory ─▶ BoardObserver (render, save)
//! ```
//!
//! Form-driven edits (add lead, rename column, comments) go straight to the
//! session and reach the same observer. [`persistence`] stores snapshots in
//! a key/value backend; [`config`] loads the tunables.

pub mod clock;
pub mod collision;
pub mod config;
pub mod controller;
pub mod elapsed;
pub mod fixtures;
pub mod history;
pub mod indicator;
pub mod layout;
pub mod model;
pub mod persistence;
pub mod session;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use collision::{CollisionStrategy, detect_collision};
pub use config::{BoardConfig, ConfigError, DEFAULT_STORAGE_KEY};
pub use controller::{ActiveDrag, DragController, DragOrigin, DragState, DropOutcome};
pub use history::{HistoryConfig, HistoryEntry, MoveHistory};
pub use indicator::{IndicatorKind, InsertPosition, InsertionIndicator, compute_indicator};
pub use layout::BoardLayout;
pub use model::{Card, CardId, Column, ColumnId, LeadComment, LeadDraft, Timestamp};
pub use persistence::{
    BoardSnapshot, FileStorage, MemoryStorage, PersistingObserver, StorageBackend, StorageError,
    load_board, load_snapshot, save_board,
};
pub use session::{BoardChange, BoardObserver, BoardSession, NoopObserver};
pub use store::{BoardStore, CardMove, RemovedColumn};
