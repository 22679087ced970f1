#![forbid(unsafe_code)]

//! Board State Store: the ordered columns and the flat, ordered card list.
//!
//! # Invariants
//!
//! 1. Every card's `column_id` names an existing column. Removing a column
//!    removes its cards in the same operation.
//! 2. A card's position inside its column is its index among the cards with
//!    the same `column_id`, in flat-list order. There is no separate order
//!    field, so positions are always gapless and duplicate-free.
//! 3. Column order is the order of `columns`.
//! 4. Ids come from a single monotonically increasing counter and are never
//!    reused, even after deletion.
//!
//! # Failure Modes
//!
//! Every mutation guards its inputs. Unknown ids turn the call into a no-op
//! (reported through the return value and a `debug` event); indices are
//! clamped, never rejected with a panic. Id allocation is checked: once the
//! counter reaches [`u64::MAX`], `add_column` and `add_card` return `None`.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::model::{Card, CardId, Column, ColumnId, LeadComment, LeadDraft, Timestamp};

/// Result of a successful [`BoardStore::move_card`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardMove {
    pub card_id: CardId,
    pub from_column: ColumnId,
    pub from_index: usize,
    pub to_column: ColumnId,
    pub to_index: usize,
    /// Entry timestamp before the move (restored on undo).
    pub previous_entered_at: Timestamp,
}

impl CardMove {
    /// Whether the card changed columns.
    #[must_use]
    pub fn crossed_columns(&self) -> bool {
        self.from_column != self.to_column
    }
}

/// A column removed by [`BoardStore::remove_column`], with its cascaded cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedColumn {
    pub column: Column,
    pub index: usize,
    pub cards: Vec<Card>,
}

/// Owner of the board's columns and cards.
pub struct BoardStore {
    columns: Vec<Column>,
    cards: Vec<Card>,
    next_id: u64,
    clock: Box<dyn Clock>,
}

impl fmt::Debug for BoardStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardStore")
            .field("columns", &self.columns.len())
            .field("cards", &self.cards.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl BoardStore {
    /// Create an empty board.
    #[must_use]
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            columns: Vec::new(),
            cards: Vec::new(),
            next_id: 1,
            clock,
        }
    }

    /// Rebuild a board from stored parts.
    ///
    /// Repairs what would break the invariants instead of failing: duplicate
    /// ids keep their first occurrence, cards pointing at a missing column are
    /// dropped, and `next_id` is raised above every id in use. Entries with id
    /// [`u64::MAX`] are dropped too, since no counter value lies above them.
    #[must_use]
    pub fn from_parts(
        columns: Vec<Column>,
        cards: Vec<Card>,
        next_id: u64,
        clock: Box<dyn Clock>,
    ) -> Self {
        let mut seen_columns = HashSet::new();
        let columns: Vec<Column> = columns
            .into_iter()
            .filter(|c| c.id.0 != u64::MAX && seen_columns.insert(c.id))
            .collect();

        let mut seen_cards = HashSet::new();
        let total = cards.len();
        let cards: Vec<Card> = cards
            .into_iter()
            .filter(|c| {
                c.id.0 != u64::MAX
                    && seen_columns.contains(&c.column_id)
                    && seen_cards.insert(c.id)
            })
            .collect();
        if cards.len() != total {
            debug!(
                target: "leadflow.store",
                dropped = total - cards.len(),
                "dropped orphaned or duplicate cards while loading"
            );
        }

        let max_used = columns
            .iter()
            .map(|c| c.id.0)
            .chain(cards.iter().map(|c| c.id.0))
            .max()
            .unwrap_or(0);
        let next_id = max_used
            .checked_add(1)
            .map_or(next_id, |floor| next_id.max(floor));

        Self {
            columns,
            cards,
            next_id,
            clock,
        }
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    /// All columns, in board order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The flat card list. Relative order within a column is meaningful.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Next id the allocator will hand out.
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Current time according to the board clock.
    #[must_use]
    pub fn now_ms(&self) -> Timestamp {
        self.clock.now_ms()
    }

    #[must_use]
    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Index of a column in the column sequence.
    #[must_use]
    pub fn column_index(&self, id: ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    /// Cards of one column, in column order.
    #[must_use]
    pub fn cards_in_column(&self, id: ColumnId) -> Vec<&Card> {
        self.cards.iter().filter(|c| c.column_id == id).collect()
    }

    /// Number of cards in a column.
    #[must_use]
    pub fn column_len(&self, id: ColumnId) -> usize {
        self.cards.iter().filter(|c| c.column_id == id).count()
    }

    /// The column holding a card and the card's index inside it.
    #[must_use]
    pub fn card_position(&self, id: CardId) -> Option<(ColumnId, usize)> {
        let card = self.card(id)?;
        let index = self
            .cards
            .iter()
            .filter(|c| c.column_id == card.column_id)
            .position(|c| c.id == id)?;
        Some((card.column_id, index))
    }

    // -----------------------------------------------------------------------
    // Reordering
    // -----------------------------------------------------------------------

    /// Move a card to `target_index` of `target_column`.
    ///
    /// The index addresses the target column *after* the card has been taken
    /// out of its current place, and is clamped to `[0, len]`. The entry
    /// timestamp is reset only when the column changes.
    ///
    /// Returns `None` (state untouched) when the card or column is unknown,
    /// or when the card already sits at the requested place.
    pub fn move_card(
        &mut self,
        card_id: CardId,
        target_column: ColumnId,
        target_index: usize,
    ) -> Option<CardMove> {
        if self.column_index(target_column).is_none() {
            debug!(
                target: "leadflow.store",
                %card_id,
                %target_column,
                "move to unknown column ignored"
            );
            return None;
        }
        let Some((from_column, from_index)) = self.card_position(card_id) else {
            debug!(target: "leadflow.store", %card_id, "move of unknown card ignored");
            return None;
        };

        let same_column = from_column == target_column;
        let len_after_removal = self.column_len(target_column) - usize::from(same_column);
        if same_column && target_index.min(len_after_removal) == from_index {
            return None;
        }

        let flat = self.cards.iter().position(|c| c.id == card_id)?;
        let mut card = self.cards.remove(flat);
        let previous_entered_at = card.column_entered_at;
        if !same_column {
            card.column_id = target_column;
            card.column_entered_at = self.clock.now_ms();
        }
        let to_index = splice_card(&mut self.cards, card, target_index);

        debug!(
            target: "leadflow.store",
            %card_id,
            %from_column,
            from_index,
            %target_column,
            to_index,
            "card moved"
        );

        Some(CardMove {
            card_id,
            from_column,
            from_index,
            to_column: target_column,
            to_index,
            previous_entered_at,
        })
    }

    /// Move the column at `source` to `target` in the column sequence.
    ///
    /// Returns `false` without touching anything when the indices are equal
    /// or either is out of range.
    pub fn reorder_columns(&mut self, source: usize, target: usize) -> bool {
        let len = self.columns.len();
        if source == target || source >= len || target >= len {
            return false;
        }
        let column = self.columns.remove(source);
        debug!(
            target: "leadflow.store",
            column_id = %column.id,
            source,
            target,
            "columns reordered"
        );
        self.columns.insert(target, column);
        true
    }

    // -----------------------------------------------------------------------
    // Column edits
    // -----------------------------------------------------------------------

    /// Append a new column with a fresh id. `None` once the id space is
    /// exhausted.
    pub fn add_column(&mut self, name: impl Into<String>) -> Option<ColumnId> {
        let id = ColumnId(self.allocate_id()?);
        self.columns.push(Column {
            id,
            name: name.into(),
        });
        debug!(target: "leadflow.store", column_id = %id, "column added");
        Some(id)
    }

    /// Rename a column in place.
    pub fn rename_column(&mut self, id: ColumnId, name: impl Into<String>) -> bool {
        match self.columns.iter_mut().find(|c| c.id == id) {
            Some(column) => {
                column.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Remove a column and every card in it.
    pub fn remove_column(&mut self, id: ColumnId) -> Option<RemovedColumn> {
        let index = self.column_index(id)?;
        let column = self.columns.remove(index);
        let (cards, kept): (Vec<Card>, Vec<Card>) = std::mem::take(&mut self.cards)
            .into_iter()
            .partition(|c| c.column_id == id);
        self.cards = kept;
        debug!(
            target: "leadflow.store",
            column_id = %id,
            cascaded = cards.len(),
            "column removed"
        );
        Some(RemovedColumn {
            column,
            index,
            cards,
        })
    }

    // -----------------------------------------------------------------------
    // Card edits (never reorder)
    // -----------------------------------------------------------------------

    /// Register a new lead at the end of `column`. `None` when the column is
    /// unknown or the id space is exhausted.
    pub fn add_card(&mut self, column: ColumnId, draft: LeadDraft) -> Option<CardId> {
        self.column_index(column)?;
        let id = CardId(self.allocate_id()?);
        let card = Card {
            id,
            name: draft.name,
            contact: draft.contact,
            email: draft.email,
            comments: Vec::new(),
            column_id: column,
            column_entered_at: self.clock.now_ms(),
        };
        splice_card(&mut self.cards, card, usize::MAX);
        debug!(target: "leadflow.store", card_id = %id, column_id = %column, "card added");
        Some(id)
    }

    /// Delete a lead.
    pub fn remove_card(&mut self, id: CardId) -> Option<Card> {
        let flat = self.cards.iter().position(|c| c.id == id)?;
        Some(self.cards.remove(flat))
    }

    /// Overwrite a lead's editable fields.
    pub fn update_card(&mut self, id: CardId, draft: LeadDraft) -> bool {
        let Some(card) = self.cards.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        card.name = draft.name;
        card.contact = draft.contact;
        card.email = draft.email;
        true
    }

    /// Append a comment to a lead, stamped with the board clock.
    pub fn add_comment(&mut self, id: CardId, text: impl Into<String>) -> bool {
        let now = self.clock.now_ms();
        let Some(card) = self.cards.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        card.comments.push(LeadComment {
            text: text.into(),
            created_at: now,
        });
        true
    }

    /// Put back an entry timestamp (used when undoing a move).
    pub(crate) fn restore_entered_at(&mut self, id: CardId, at: Timestamp) -> bool {
        let Some(card) = self.cards.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        card.column_entered_at = at;
        true
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    /// Describe every broken invariant. Empty when the board is consistent.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut column_ids = HashSet::new();
        for column in &self.columns {
            if !column_ids.insert(column.id) {
                errors.push(format!("duplicate column id {}", column.id));
            }
            if column.id.0 >= self.next_id {
                errors.push(format!("column id {} not below next_id {}", column.id, self.next_id));
            }
        }

        let mut card_ids = HashSet::new();
        for card in &self.cards {
            if !card_ids.insert(card.id) {
                errors.push(format!("duplicate card id {}", card.id));
            }
            if !column_ids.contains(&card.column_id) {
                errors.push(format!(
                    "card {} references missing column {}",
                    card.id, card.column_id
                ));
            }
            if card.id.0 >= self.next_id {
                errors.push(format!("card id {} not below next_id {}", card.id, self.next_id));
            }
            if column_ids.contains(&ColumnId(card.id.0)) {
                errors.push(format!("card id {} collides with a column id", card.id));
            }
        }

        errors
    }

    fn allocate_id(&mut self) -> Option<u64> {
        let id = self.next_id;
        let Some(next) = id.checked_add(1) else {
            warn!(target: "leadflow.store", next_id = id, "id space exhausted");
            return None;
        };
        self.next_id = next;
        Some(id)
    }
}

/// Insert `card` into its column's subsequence at `index`, clamped to
/// `[0, len]`. Returns the index actually used.
///
/// This is the only place cards are inserted into the flat list.
pub(crate) fn splice_card(cards: &mut Vec<Card>, card: Card, index: usize) -> usize {
    let column = card.column_id;
    let mut seen = 0usize;
    let mut last = None;
    let mut at = None;
    for (flat, existing) in cards.iter().enumerate() {
        if existing.column_id != column {
            continue;
        }
        if seen == index {
            at = Some(flat);
            break;
        }
        last = Some(flat);
        seen += 1;
    }

    match at {
        Some(flat) => {
            cards.insert(flat, card);
            index
        }
        None => {
            let flat = last.map_or(cards.len(), |l| l + 1);
            cards.insert(flat, card);
            seen
        }
    }
}
