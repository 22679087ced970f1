#![forbid(unsafe_code)]

//! Board configuration as data.
//!
//! # Loading
//!
//! ```toml
//! # leadflow.toml
//! storage_key = "crm.kanban.board"
//! history_depth = 50
//! collision = "nearest_center"
//! default_columns = ["Novo", "Contato", "Proposta", "Fechado"]
//! seed_leads = false
//!
//! [layout]
//! column_width = 28
//! ```
//!
//! ```rust,ignore
//! let config = BoardConfig::from_toml_file("leadflow.toml")?;
//! let config = BoardConfig::from_json_str(json)?;
//! ```
//!
//! Every field has a default, so partial files are fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::collision::CollisionStrategy;
use crate::history::HistoryConfig;
use crate::layout::BoardLayout;

/// Key the board snapshot is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "crm.kanban.board";

/// Top-level configuration for a lead board session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Storage key of the persisted snapshot.
    pub storage_key: String,
    /// Maximum number of undoable moves.
    pub history_depth: usize,
    /// Collision strategy for drag gestures.
    pub collision: CollisionStrategy,
    /// Columns of a fresh board, in order.
    pub default_columns: Vec<String>,
    /// Whether a fresh board is seeded with sample leads.
    pub seed_leads: bool,
    /// Host grid geometry used by replay and hit testing.
    pub layout: BoardLayout,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            history_depth: HistoryConfig::default().max_depth,
            collision: CollisionStrategy::default(),
            default_columns: crate::fixtures::DEFAULT_COLUMNS
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            seed_leads: true,
            layout: BoardLayout::default(),
        }
    }
}

impl BoardConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path.as_ref())?)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&read(path.as_ref())?)
    }

    /// Load by file extension (`.json` is JSON, anything else TOML), then
    /// validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_file(path)?,
            _ => Self::from_toml_file(path)?,
        };
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Validate all parameters.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.storage_key.trim().is_empty() {
            errors.push("storage_key must not be empty".to_string());
        }
        if self.history_depth == 0 {
            errors.push("history_depth must be at least 1".to_string());
        }
        if self.default_columns.is_empty() {
            errors.push("default_columns must name at least one column".to_string());
        }
        for (i, name) in self.default_columns.iter().enumerate() {
            if name.trim().is_empty() {
                errors.push(format!("default_columns[{i}] is blank"));
            }
        }
        errors.extend(self.layout.validate());

        errors
    }

    /// History limits derived from this config.
    #[must_use]
    pub fn history(&self) -> HistoryConfig {
        HistoryConfig {
            max_depth: self.history_depth,
        }
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------

/// Errors that can occur when loading a board configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
