#![forbid(unsafe_code)]

//! Board entities: columns (pipeline stages) and cards (leads).
//!
//! Order is never stored on the entities. A column's position is its index in
//! the column sequence; a card's position is its index among the cards that
//! share its `column_id`, in flat-list order.

use serde::{Deserialize, Serialize};

pub use leadflow_core::{CardId, ColumnId};

/// Milliseconds since the UNIX epoch.
pub type Timestamp = u64;

/// A named stage of the sales pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
}

/// A free-form note attached to a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadComment {
    pub text: String,
    pub created_at: Timestamp,
}

/// A tracked lead. Belongs to exactly one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    /// Phone number as typed by the user.
    pub contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<LeadComment>,
    pub column_id: ColumnId,
    /// When the card entered its current column.
    pub column_entered_at: Timestamp,
}

/// Editable lead fields, as submitted by the registration and edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadDraft {
    pub name: String,
    pub contact: String,
    pub email: Option<String>,
}

impl LeadDraft {
    /// Draft with a name and phone contact.
    #[must_use]
    pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
            email: None,
        }
    }

    /// Attach an email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
