use crate::models::SaveId;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Repository not initialized")]
    NotInitialized,

    #[error("Repository already initialized at: {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid save ID: {0}")]
    InvalidSave(SaveId),

    #[error("No changes to save")]
    NoChanges,

    #[error("Content of {0} contains the changelog entry terminator and cannot be stored")]
    Unrepresentable(String),

    #[error("Corrupt history in save {save}: {reason}")]
    CorruptHistory { save: SaveId, reason: String },
}

impl Error {
    pub(crate) fn corrupt(save: SaveId, reason: impl Into<String>) -> Self {
        Error::CorruptHistory {
            save,
            reason: reason.into(),
        }
    }
}
