//! Replay scripts: scripted drag gestures in JSON.
//!
//! ```json
//! [
//!   { "op": "drag", "item": { "kind": "card", "id": 5 }, "path": [[45, 10]] },
//!   { "op": "pick", "from": [3, 1], "path": [[40, 4], [45, 9]] },
//!   { "op": "events", "events": [{ "phase": "cancel" }] },
//!   { "op": "undo" },
//!   { "op": "redo" }
//! ]
//! ```
//!
//! `drag` names the item, `pick` grabs whatever is under `from`. Both hover
//! every point of `path` and release at the last one; an empty path releases
//! over nothing. `events` feeds raw events as a host would send them.

use std::path::Path;

use leadflow_board::{BoardLayout, BoardSession, DropOutcome};
use leadflow_core::{DragEvent, DragItem, Point};
use serde::{Deserialize, Serialize};

use crate::error::{DoctorError, Result};

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Drag {
        item: DragItem,
        #[serde(default)]
        path: Vec<(u16, u16)>,
    },
    Pick {
        from: (u16, u16),
        #[serde(default)]
        path: Vec<(u16, u16)>,
    },
    Events {
        events: Vec<DragEvent>,
    },
    Undo,
    Redo,
}

/// What a step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Dropped(DropOutcome),
    /// `pick` found nothing under the pointer, or `events` never ended.
    Skipped,
    Undone(bool),
    Redone(bool),
}

impl StepResult {
    #[must_use]
    pub fn changed_board(&self) -> bool {
        match self {
            Self::Dropped(outcome) => outcome.changed_board(),
            Self::Undone(changed) | Self::Redone(changed) => *changed,
            Self::Skipped => false,
        }
    }

    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Dropped(DropOutcome::CardMoved(moved)) => format!(
                "moved {} from {}[{}] to {}[{}]",
                moved.card_id, moved.from_column, moved.from_index, moved.to_column, moved.to_index
            ),
            Self::Dropped(DropOutcome::ColumnsReordered {
                column_id,
                from,
                to,
            }) => format!("moved {column_id} from position {from} to {to}"),
            Self::Dropped(DropOutcome::NoOp) => "no change".to_string(),
            Self::Dropped(DropOutcome::Cancelled) => "cancelled".to_string(),
            Self::Skipped => "skipped".to_string(),
            Self::Undone(true) => "undone".to_string(),
            Self::Redone(true) => "redone".to_string(),
            Self::Undone(false) => "nothing to undo".to_string(),
            Self::Redone(false) => "nothing to redo".to_string(),
        }
    }
}

/// Parse a script file.
pub fn load_script(path: &Path) -> Result<Vec<Step>> {
    if !path.exists() {
        return Err(DoctorError::MissingPath {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| DoctorError::InvalidScript {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Run one step against the session.
pub fn run_step(session: &mut BoardSession, layout: &BoardLayout, step: &Step) -> StepResult {
    match step {
        Step::Drag { item, path } => gesture(session, layout, *item, path),
        Step::Pick { from, path } => match layout.hit_test(session.store(), Point::from(*from)) {
            Some(item) => gesture(session, layout, item, path),
            None => StepResult::Skipped,
        },
        Step::Events { events } => events
            .iter()
            .filter_map(|event| session.handle_drag(event))
            .last()
            .map_or(StepResult::Skipped, StepResult::Dropped),
        Step::Undo => StepResult::Undone(session.undo()),
        Step::Redo => StepResult::Redone(session.redo()),
    }
}

fn gesture(
    session: &mut BoardSession,
    layout: &BoardLayout,
    item: DragItem,
    path: &[(u16, u16)],
) -> StepResult {
    session.handle_drag(&DragEvent::Start { item });
    let mut last = None;
    for &at in path {
        // Geometry comes from the board as it is before the drop.
        if let Some(geometry) = layout.geometry(session.store(), item, Point::from(at)) {
            last = Some(geometry.clone());
            session.handle_drag(&DragEvent::Over { geometry });
        }
    }
    session
        .handle_drag(&DragEvent::End { geometry: last })
        .map_or(StepResult::Skipped, StepResult::Dropped)
}
