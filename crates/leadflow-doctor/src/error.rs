use std::path::PathBuf;

use leadflow_board::{ConfigError, StorageError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DoctorError>;

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid script {path}: {message}")]
    InvalidScript { path: PathBuf, message: String },

    #[error("required path does not exist: {path}")]
    MissingPath { path: PathBuf },

    #[error("{message}")]
    Exit { code: i32, message: String },
}

/// Exit code for a failed check or a storage, I/O, or JSON failure.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for bad input: a missing path, an unreadable script or config,
/// or a refused command.
pub const EXIT_USAGE: i32 = 2;

impl DoctorError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Exit { code, .. } => *code,
            Self::MissingPath { .. } | Self::InvalidScript { .. } | Self::Config(_) => EXIT_USAGE,
            Self::Io(_) | Self::Json(_) | Self::Storage(_) => EXIT_FAILURE,
        }
    }

    /// The command refused to run as asked.
    #[must_use]
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Exit {
            code: EXIT_USAGE,
            message: message.into(),
        }
    }

    /// The command ran and found problems.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Exit {
            code: EXIT_FAILURE,
            message: message.into(),
        }
    }
}
