#![forbid(unsafe_code)]

//! "Time in current column" text for cards.
//!
//! Two most significant units, truncated: `45s`, `12m`, `3h 5m`, `2d 4h`.
//! An entry time in the future reads as `0s`.

use crate::model::{CardId, Timestamp};
use crate::store::BoardStore;

const SECOND: u64 = 1_000;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Format a duration in milliseconds.
#[must_use]
pub fn format_elapsed(elapsed_ms: u64) -> String {
    if elapsed_ms < MINUTE {
        format!("{}s", elapsed_ms / SECOND)
    } else if elapsed_ms < HOUR {
        format!("{}m", elapsed_ms / MINUTE)
    } else if elapsed_ms < DAY {
        format!("{}h {}m", elapsed_ms / HOUR, (elapsed_ms % HOUR) / MINUTE)
    } else {
        format!("{}d {}h", elapsed_ms / DAY, (elapsed_ms % DAY) / HOUR)
    }
}

/// Format the time between `entered_at` and `now`.
#[must_use]
pub fn format_since(entered_at: Timestamp, now: Timestamp) -> String {
    format_elapsed(now.saturating_sub(entered_at))
}

/// How long `card` has been in its current column, per the board's clock.
#[must_use]
pub fn time_in_column(board: &BoardStore, card: CardId) -> Option<String> {
    let card = board.card(card)?;
    Some(format_since(card.column_entered_at, board.now_ms()))
}
