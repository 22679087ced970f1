#![forbid(unsafe_code)]

//! Board snapshots in a key/value store.
//!
//! # Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "saved_at": "2026-03-02T14:05:09Z",
//!   "next_id": 12,
//!   "columns": [{ "id": 1, "name": "Novo" }, ...],
//!   "cards": [{ "id": 5, "name": "...", "contact": "...", "column_id": 1,
//!               "column_entered_at": 1772460309000 }, ...]
//! }
//! ```
//!
//! Columns and cards are saved together, along with the id counter, so ids
//! stay unique across sessions.
//!
//! # Failure Modes
//!
//! - **Missing key**: `load_snapshot` returns `Ok(None)`.
//! - **Malformed, wrong-version, or out-of-range-id data**: an error from
//!   `load_snapshot`; `load_board` logs a warning and falls back to the
//!   default board.
//! - **Write failures** from [`PersistingObserver`] are logged and counted,
//!   never propagated into the board.
//!
//! # Atomic Writes
//!
//! [`FileStorage`] writes to a temp file and renames it over the target.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::BoardConfig;
use crate::fixtures::seed_board;
use crate::model::{Card, Column, Timestamp};
use crate::session::{BoardChange, BoardObserver};
use crate::store::BoardStore;

/// Current snapshot format version.
pub const FORMAT_VERSION: u64 = 1;

/// Errors from storage backends and snapshot decoding.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("failed to serialize board: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("malformed board snapshot: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("unsupported snapshot version {found} (expected {FORMAT_VERSION})")]
    UnsupportedVersion { found: u64 },
    #[error("snapshot id {id} leaves no room for the id counter")]
    IdOutOfRange { id: u64 },
}

pub type Result<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

/// String key/value storage, in the shape of browser local storage.
pub trait StorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        let temp = path.with_extension("json.tmp");
        std::fs::write(&temp, value)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Stored form of a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub version: u64,
    pub saved_at: String,
    pub next_id: u64,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl BoardSnapshot {
    /// Capture the current board, stamped with the board clock.
    #[must_use]
    pub fn capture(board: &BoardStore) -> Self {
        Self {
            version: FORMAT_VERSION,
            saved_at: iso8601(board.now_ms()),
            next_id: board.next_id(),
            columns: board.columns().to_vec(),
            cards: board.cards().to_vec(),
        }
    }

    /// Decode and version-check a stored snapshot.
    ///
    /// Ids equal to [`u64::MAX`] are refused: the counter could never move
    /// past them.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json).map_err(StorageError::Malformed)?;
        if snapshot.version != FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: snapshot.version,
            });
        }
        let mut ids = snapshot
            .columns
            .iter()
            .map(|c| c.id.0)
            .chain(snapshot.cards.iter().map(|c| c.id.0));
        if let Some(id) = ids.find(|&id| id == u64::MAX) {
            return Err(StorageError::IdOutOfRange { id });
        }
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(StorageError::Serialize)
    }

    /// Rebuild a store. Inconsistent data is repaired, see
    /// [`BoardStore::from_parts`].
    #[must_use]
    pub fn into_store(self, clock: Box<dyn Clock>) -> BoardStore {
        BoardStore::from_parts(self.columns, self.cards, self.next_id, clock)
    }
}

/// Save `board` under `key`.
pub fn save_board(storage: &dyn StorageBackend, key: &str, board: &BoardStore) -> Result<()> {
    let json = BoardSnapshot::capture(board).to_json()?;
    storage.set(key, &json)?;
    debug!(
        target: "leadflow.persist",
        key,
        columns = board.columns().len(),
        cards = board.cards().len(),
        "board saved"
    );
    Ok(())
}

/// Read the snapshot under `key`, if any.
pub fn load_snapshot(storage: &dyn StorageBackend, key: &str) -> Result<Option<BoardSnapshot>> {
    storage
        .get(key)?
        .map(|json| BoardSnapshot::from_json(&json))
        .transpose()
}

/// Restore the board stored under the configured key, or build the default
/// board when nothing usable is stored.
#[must_use]
pub fn load_board(
    storage: &dyn StorageBackend,
    config: &BoardConfig,
    clock: Box<dyn Clock>,
) -> BoardStore {
    match load_snapshot(storage, &config.storage_key) {
        Ok(Some(snapshot)) => {
            debug!(target: "leadflow.persist", key = %config.storage_key, "board restored");
            snapshot.into_store(clock)
        }
        Ok(None) => {
            debug!(
                target: "leadflow.persist",
                key = %config.storage_key,
                "no stored board, using defaults"
            );
            seed_board(config, clock)
        }
        Err(err) => {
            warn!(
                target: "leadflow.persist",
                key = %config.storage_key,
                error = %err,
                "stored board unreadable, using defaults"
            );
            seed_board(config, clock)
        }
    }
}

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// Saves the whole board after every change.
#[derive(Debug)]
pub struct PersistingObserver<S> {
    storage: S,
    key: String,
    failures: usize,
}

impl<S: StorageBackend> PersistingObserver<S> {
    #[must_use]
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            failures: 0,
        }
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Number of saves that failed so far.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.failures
    }
}

impl<S: StorageBackend> BoardObserver for PersistingObserver<S> {
    fn board_changed(&mut self, board: &BoardStore, change: &BoardChange) {
        if let Err(err) = save_board(&self.storage, &self.key, board) {
            self.failures += 1;
            warn!(
                target: "leadflow.persist",
                key = %self.key,
                ?change,
                error = %err,
                "failed to save board"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Time formatting
// ---------------------------------------------------------------------------

/// `YYYY-MM-DDTHH:MM:SSZ` for a millisecond timestamp.
fn iso8601(ms: Timestamp) -> String {
    let ms = i64::try_from(ms).unwrap_or(i64::MAX);
    DateTime::<Utc>::from_timestamp_millis(ms)
        .unwrap_or_default()
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}
