use crate::core::types::Identity;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RestoreError {
    #[error("Identity lookup failed for '{username}': {reason}")]
    LookupFailed { username: String, reason: String },

    #[error("Profile fetch failed for {identity}: {reason}")]
    FetchFailed { identity: Identity, reason: String },

    #[error("Migration {source_id} -> {dest_id} failed at {}: {reason}", path.display())]
    MigrationFailed {
        source_id: Identity,
        dest_id: Identity,
        path: PathBuf,
        reason: String,
    },

    #[error("Storage error at {}: {reason}", path.display())]
    Storage { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Host control context is closed")]
    ControlClosed,

    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("Worker error: {0}")]
    Worker(String),
}

impl RestoreError {
    pub(crate) fn storage(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// True for failures that the interactive paths must report to the player.
    pub fn is_migration_failure(&self) -> bool {
        matches!(self, Self::MigrationFailed { .. })
    }
}

pub type Result<T> = std::result::Result<T, RestoreError>;

impl From<tokio::task::JoinError> for RestoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Worker(err.to_string())
    }
}
