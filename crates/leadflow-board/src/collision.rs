#![forbid(unsafe_code)]

//! Collision detection: which droppable is the dragged element over?
//!
//! # Algorithm
//!
//! 1. **Nearest center** (primary): among the *preferred* droppables, pick
//!    the one whose center is closest to the center of the dragged
//!    rectangle. The caller decides what is preferred (cards compete with
//!    cards, columns with columns). Distances are squared euclidean in
//!    doubled integer space, so no floating point is involved. Ties go to the
//!    first registered droppable.
//! 2. **Intersection** (fallback, only when step 1 finds nothing): the first
//!    droppable of any kind, in registration order, whose bounds overlap the
//!    dragged rectangle.
//!
//! # Invariants
//!
//! - The dragged element is never its own drop target.
//! - Empty droppables (zero width or height) never match.
//! - Same geometry always yields the same target.

use leadflow_core::{DragItem, DropTarget, Droppable, Rect};
use serde::{Deserialize, Serialize};

/// Which strategies the detector may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionStrategy {
    /// Nearest center only.
    NearestCenter,
    /// Nearest center, then bounding-box intersection when nothing is eligible.
    #[default]
    NearestCenterThenIntersection,
}

/// Find the drop target for `active` given its current rectangle.
///
/// `droppables` are in registration order. `prefer` selects the candidates
/// the nearest-center pass may return; the intersection fallback considers
/// every droppable. The active element itself is always skipped.
#[must_use]
pub fn detect_collision(
    active: DragItem,
    active_rect: Rect,
    droppables: &[Droppable],
    prefer: impl Fn(DropTarget) -> bool,
    strategy: CollisionStrategy,
) -> Option<DropTarget> {
    let own = active.as_target();
    let usable = |d: &&Droppable| d.target != own && !d.rect.is_empty();

    let preferred = droppables
        .iter()
        .filter(usable)
        .filter(|d| prefer(d.target));
    if let Some(target) = nearest_center(active_rect, preferred) {
        return Some(target);
    }

    match strategy {
        CollisionStrategy::NearestCenter => None,
        CollisionStrategy::NearestCenterThenIntersection => droppables
            .iter()
            .filter(usable)
            .find(|d| d.rect.intersects(&active_rect))
            .map(|d| d.target),
    }
}

/// Droppable whose center is closest to the center of `active_rect`.
fn nearest_center<'a>(
    active_rect: Rect,
    candidates: impl Iterator<Item = &'a Droppable>,
) -> Option<DropTarget> {
    let mut best: Option<(DropTarget, i64)> = None;
    for candidate in candidates {
        let score = active_rect.center_distance_sq(&candidate.rect);
        if best.is_none_or(|(_, best_score)| score < best_score) {
            best = Some((candidate.target, score));
        }
    }
    best.map(|(target, _)| target)
}
